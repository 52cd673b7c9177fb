//! 页面驱动 trait：工具层消费的浏览器边界
//!
//! 驱动只提供「立即执行」的原语（解析定位器、点击第 n 个匹配、截图等）；
//! 等待、严格模式、断言轮询由 [`crate::browser::Page`] 在其上实现。

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::browser::{BrowserError, Locator};

/// 定位器匹配到的单个元素的快照
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementState {
    pub tag: String,
    pub visible: bool,
    pub enabled: bool,
    /// 规整空白后的 innerText
    pub text: String,
    pub attributes: BTreeMap<String, String>,
}

impl ElementState {
    /// 可见、可用、带文本的元素（测试与 MockPage 常用）
    pub fn visible(text: impl Into<String>) -> Self {
        Self {
            tag: "div".into(),
            visible: true,
            enabled: true,
            text: text.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn hidden(text: impl Into<String>) -> Self {
        Self {
            visible: false,
            ..Self::visible(text)
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn is_actionable(&self) -> bool {
        self.visible && self.enabled
    }
}

/// 后退后到达的历史记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub url: String,
    pub status: Option<u16>,
}

#[async_trait]
pub trait PageDriver: Send + Sync {
    /// 导航到 URL，返回主文档的 HTTP 状态码（驱动拿不到时为 None）
    async fn goto(&self, url: &str) -> Result<Option<u16>, BrowserError>;

    /// 历史后退；没有上一页时返回 Ok(None)
    async fn go_back(&self) -> Result<Option<HistoryEntry>, BrowserError>;

    async fn url(&self) -> Result<String, BrowserError>;

    async fn title(&self) -> Result<String, BrowserError>;

    /// 当前页面 HTML
    async fn content(&self) -> Result<String, BrowserError>;

    /// 解析定位器（不含 visible/first 修饰），返回全部匹配元素的快照；无匹配为空 Vec
    async fn query_elements(&self, locator: &Locator) -> Result<Vec<ElementState>, BrowserError>;

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), BrowserError>;

    async fn fill_nth(&self, locator: &Locator, index: usize, value: &str)
        -> Result<(), BrowserError>;

    async fn set_input_files_nth(
        &self,
        locator: &Locator,
        index: usize,
        files: &[PathBuf],
    ) -> Result<(), BrowserError>;

    /// 当前视口 PNG 截图
    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError>;
}
