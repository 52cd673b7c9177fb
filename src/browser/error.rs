//! 浏览器层错误类型
//!
//! 工具层据 `is_timeout()` 区分「可降级重试」的超时类错误与其他错误。

use thiserror::Error;

/// 页面操作可能出现的错误
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("browser launch failed: {0}")]
    LaunchFailed(String),

    #[error("navigation failed: {0}")]
    NavigationFailed(String),

    #[error("Timeout {timeout_ms}ms exceeded while waiting to {action} {locator}")]
    Timeout {
        action: String,
        locator: String,
        timeout_ms: u64,
    },

    #[error("strict mode violation: {locator} resolved to {count} elements")]
    StrictModeViolation { locator: String, count: usize },

    #[error("element {index} of {locator} is no longer attached to the page")]
    ElementDetached { locator: String, index: usize },

    #[error("expectation failed: {assertion} ({detail})")]
    ExpectationFailed { assertion: String, detail: String },

    #[error("JavaScript evaluation failed: {0}")]
    JsEvalFailed(String),

    #[error("screenshot failed: {0}")]
    ScreenshotFailed(String),

    #[error("file upload failed: {0}")]
    UploadFailed(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl BrowserError {
    /// 超时类错误（等待元素超时、断言在超时内未满足）
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::ExpectationFailed { .. })
    }
}
