//! MockPage：脚本化的 PageDriver，供工具测试与离线演示使用
//!
//! 元素按定位器描述（`Locator::describe()`）登记；动作调用记录在 `calls()` 中，
//! 可为指定定位器注入点击 / 填写失败。

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::browser::{BrowserError, ElementState, HistoryEntry, Locator, PageDriver};

/// 最小的 PNG 文件头，截图返回它
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

#[derive(Default)]
struct MockState {
    url: String,
    title: String,
    content: String,
    history: Vec<String>,
    statuses: HashMap<String, u16>,
    elements: HashMap<String, Vec<ElementState>>,
    click_failures: HashMap<String, String>,
    fill_failures: HashMap<String, String>,
    goto_failure: Option<String>,
    screenshot_failure: Option<String>,
    calls: Vec<String>,
}

#[derive(Default)]
pub struct MockPage {
    state: Mutex<MockState>,
}

impl MockPage {
    pub fn new() -> Self {
        let page = Self::default();
        page.state().url = "about:blank".to_string();
        page
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn set_url(&self, url: &str) {
        self.state().url = url.to_string();
    }

    pub fn set_title(&self, title: &str) {
        self.state().title = title.to_string();
    }

    pub fn set_content(&self, html: &str) {
        self.state().content = html.to_string();
    }

    /// 导航到 url 时返回的状态码（默认 200）
    pub fn set_status(&self, url: &str, status: u16) {
        self.state().statuses.insert(url.to_string(), status);
    }

    /// 登记定位器描述（如 `getByRole('button').getByText('OK')`）对应的匹配元素
    pub fn set_elements(&self, describe: &str, elements: Vec<ElementState>) {
        self.state().elements.insert(describe.to_string(), elements);
    }

    pub fn fail_click(&self, describe: &str, message: &str) {
        self.state()
            .click_failures
            .insert(describe.to_string(), message.to_string());
    }

    pub fn fail_fill(&self, describe: &str, message: &str) {
        self.state()
            .fill_failures
            .insert(describe.to_string(), message.to_string());
    }

    pub fn fail_goto(&self, message: &str) {
        self.state().goto_failure = Some(message.to_string());
    }

    pub fn fail_screenshot(&self, message: &str) {
        self.state().screenshot_failure = Some(message.to_string());
    }

    /// 已执行的动作（goto / back / click / fill / upload / screenshot）
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    fn check_index(state: &MockState, locator: &Locator, index: usize) -> Result<(), BrowserError> {
        let len = state
            .elements
            .get(&locator.describe())
            .map(Vec::len)
            .unwrap_or(0);
        if index < len {
            Ok(())
        } else {
            Err(BrowserError::ElementDetached {
                locator: locator.to_string(),
                index,
            })
        }
    }
}

#[async_trait]
impl PageDriver for MockPage {
    async fn goto(&self, url: &str) -> Result<Option<u16>, BrowserError> {
        let mut state = self.state();
        state.calls.push(format!("goto {url}"));
        if let Some(message) = state.goto_failure.clone() {
            return Err(BrowserError::NavigationFailed(message));
        }
        let previous = std::mem::replace(&mut state.url, url.to_string());
        if previous != "about:blank" {
            state.history.push(previous);
        }
        Ok(Some(state.statuses.get(url).copied().unwrap_or(200)))
    }

    async fn go_back(&self) -> Result<Option<HistoryEntry>, BrowserError> {
        let mut state = self.state();
        state.calls.push("back".to_string());
        let Some(url) = state.history.pop() else {
            return Ok(None);
        };
        state.url = url.clone();
        let status = state.statuses.get(&url).copied().unwrap_or(200);
        Ok(Some(HistoryEntry {
            url,
            status: Some(status),
        }))
    }

    async fn url(&self) -> Result<String, BrowserError> {
        Ok(self.state().url.clone())
    }

    async fn title(&self) -> Result<String, BrowserError> {
        Ok(self.state().title.clone())
    }

    async fn content(&self) -> Result<String, BrowserError> {
        Ok(self.state().content.clone())
    }

    async fn query_elements(&self, locator: &Locator) -> Result<Vec<ElementState>, BrowserError> {
        Ok(self
            .state()
            .elements
            .get(&locator.describe())
            .cloned()
            .unwrap_or_default())
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), BrowserError> {
        let mut state = self.state();
        let key = locator.describe();
        state.calls.push(format!("click {key} #{index}"));
        if let Some(message) = state.click_failures.get(&key) {
            return Err(BrowserError::JsEvalFailed(message.clone()));
        }
        Self::check_index(&state, locator, index)
    }

    async fn fill_nth(
        &self,
        locator: &Locator,
        index: usize,
        value: &str,
    ) -> Result<(), BrowserError> {
        let mut state = self.state();
        let key = locator.describe();
        state.calls.push(format!("fill {key} #{index} = {value}"));
        if let Some(message) = state.fill_failures.get(&key) {
            return Err(BrowserError::JsEvalFailed(message.clone()));
        }
        Self::check_index(&state, locator, index)
    }

    async fn set_input_files_nth(
        &self,
        locator: &Locator,
        index: usize,
        files: &[PathBuf],
    ) -> Result<(), BrowserError> {
        let mut state = self.state();
        let names: Vec<String> = files.iter().map(|f| f.display().to_string()).collect();
        state
            .calls
            .push(format!("upload {} #{index} [{}]", locator.describe(), names.join(", ")));
        Self::check_index(&state, locator, index)
    }

    async fn screenshot(&self) -> Result<Vec<u8>, BrowserError> {
        let mut state = self.state();
        state.calls.push("screenshot".to_string());
        match state.screenshot_failure.clone() {
            Some(message) => Err(BrowserError::ScreenshotFailed(message)),
            None => Ok(PNG_SIGNATURE.to_vec()),
        }
    }
}
