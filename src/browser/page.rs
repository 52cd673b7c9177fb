//! Page：在 PageDriver 原语之上实现等待、严格模式与截图落盘
//!
//! - 动作（click / fill / set_input_files）轮询直到出现可见且可用的匹配，超时返回 `BrowserError::Timeout`
//! - 严格模式下匹配数 > 1 立即返回 `StrictModeViolation`（`first` 修饰的定位器不受限）
//! - `visible_only` 修饰先过滤不可见元素，再判断严格性

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::browser::{BrowserError, ElementState, HistoryEntry, Locator, PageDriver};

const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// 动作选项：等待超时与是否启用严格模式
#[derive(Debug, Clone, Copy)]
pub struct ActionOptions {
    pub timeout: Duration,
    pub strict: bool,
}

impl ActionOptions {
    pub fn new(timeout: Duration, strict: bool) -> Self {
        Self { timeout, strict }
    }
}

impl Default for ActionOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            strict: true,
        }
    }
}

/// 绑定到一个浏览器会话的页面句柄，工具之间共享 `Arc<Page>`
pub struct Page {
    driver: Arc<dyn PageDriver>,
    poll_interval: Duration,
}

impl Page {
    pub fn new(driver: Arc<dyn PageDriver>) -> Self {
        Self {
            driver,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub async fn goto(&self, url: &str) -> Result<Option<u16>, BrowserError> {
        self.driver.goto(url).await
    }

    pub async fn go_back(&self) -> Result<Option<HistoryEntry>, BrowserError> {
        self.driver.go_back().await
    }

    pub async fn url(&self) -> Result<String, BrowserError> {
        self.driver.url().await
    }

    pub async fn title(&self) -> Result<String, BrowserError> {
        self.driver.title().await
    }

    pub async fn content(&self) -> Result<String, BrowserError> {
        self.driver.content().await
    }

    /// 应用 visible/first 修饰后的匹配（保留驱动侧下标，供 click_nth 等使用）
    pub(crate) async fn matches(
        &self,
        locator: &Locator,
    ) -> Result<Vec<(usize, ElementState)>, BrowserError> {
        let mut matched: Vec<(usize, ElementState)> = self
            .driver
            .query_elements(locator)
            .await?
            .into_iter()
            .enumerate()
            .filter(|(_, state)| !locator.visible_only || state.visible)
            .collect();
        if locator.first {
            matched.truncate(1);
        }
        Ok(matched)
    }

    /// 立即返回全部匹配元素（不等待、不检查严格性）
    pub async fn elements(&self, locator: &Locator) -> Result<Vec<ElementState>, BrowserError> {
        Ok(self
            .matches(locator)
            .await?
            .into_iter()
            .map(|(_, state)| state)
            .collect())
    }

    pub async fn count(&self, locator: &Locator) -> Result<usize, BrowserError> {
        Ok(self.matches(locator).await?.len())
    }

    /// 不等待；无匹配为 false，多个匹配违反严格模式
    pub async fn is_visible(&self, locator: &Locator) -> Result<bool, BrowserError> {
        let matched = self.matches(locator).await?;
        match matched.as_slice() {
            [] => Ok(false),
            [(_, state)] => Ok(state.visible),
            _ => Err(BrowserError::StrictModeViolation {
                locator: locator.to_string(),
                count: matched.len(),
            }),
        }
    }

    async fn wait_for_actionable(
        &self,
        locator: &Locator,
        action: &str,
        opts: ActionOptions,
    ) -> Result<usize, BrowserError> {
        let deadline = Instant::now() + opts.timeout;
        loop {
            let matched = self.matches(locator).await?;
            if opts.strict && matched.len() > 1 {
                return Err(BrowserError::StrictModeViolation {
                    locator: locator.to_string(),
                    count: matched.len(),
                });
            }
            if let Some((index, _)) = matched.iter().find(|(_, state)| state.is_actionable()) {
                return Ok(*index);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::Timeout {
                    action: action.to_string(),
                    locator: locator.to_string(),
                    timeout_ms: opts.timeout.as_millis() as u64,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        }
    }

    pub async fn click(&self, locator: &Locator, opts: ActionOptions) -> Result<(), BrowserError> {
        let index = self.wait_for_actionable(locator, "click", opts).await?;
        tracing::debug!(locator = %locator, index, "click");
        self.driver.click_nth(locator, index).await
    }

    pub async fn fill(
        &self,
        locator: &Locator,
        value: &str,
        opts: ActionOptions,
    ) -> Result<(), BrowserError> {
        let index = self.wait_for_actionable(locator, "fill", opts).await?;
        self.driver.fill_nth(locator, index, value).await
    }

    /// 文件输入框通常被样式隐藏，只等待元素出现，不要求可见
    pub async fn set_input_files(
        &self,
        locator: &Locator,
        files: &[PathBuf],
        opts: ActionOptions,
    ) -> Result<(), BrowserError> {
        let deadline = Instant::now() + opts.timeout;
        let index = loop {
            let matched = self.matches(locator).await?;
            if opts.strict && matched.len() > 1 {
                return Err(BrowserError::StrictModeViolation {
                    locator: locator.to_string(),
                    count: matched.len(),
                });
            }
            if let Some((index, _)) = matched.first() {
                break *index;
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::Timeout {
                    action: "set input files on".to_string(),
                    locator: locator.to_string(),
                    timeout_ms: opts.timeout.as_millis() as u64,
                });
            }
            sleep(self.poll_interval.min(deadline - now)).await;
        };
        self.driver.set_input_files_nth(locator, index, files).await
    }

    /// 截图并写入 path（自动创建父目录），返回写入字节数
    pub async fn screenshot(&self, path: &Path) -> Result<usize, BrowserError> {
        let png = self.driver.screenshot().await?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(path, &png).await?;
        Ok(png.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::MockPage;

    fn page_with(mock: &Arc<MockPage>) -> Page {
        Page::new(mock.clone()).with_poll_interval(Duration::from_millis(5))
    }

    fn fast(strict: bool) -> ActionOptions {
        ActionOptions::new(Duration::from_millis(30), strict)
    }

    #[tokio::test]
    async fn test_click_first_actionable_match() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements(
            "locator('li')",
            vec![ElementState::hidden("a"), ElementState::visible("b")],
        );
        let page = page_with(&mock);
        page.click(&Locator::css("li"), fast(false)).await.unwrap();
        assert_eq!(mock.calls(), vec!["click locator('li') #1"]);
    }

    #[tokio::test]
    async fn test_count_applies_modifiers() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements(
            "locator('tr')",
            vec![
                ElementState::visible("a"),
                ElementState::hidden("b"),
                ElementState::visible("c"),
            ],
        );
        let page = page_with(&mock);
        assert_eq!(page.count(&Locator::css("tr")).await.unwrap(), 3);
        assert_eq!(page.count(&Locator::css("tr").visible(true)).await.unwrap(), 2);
        assert_eq!(page.count(&Locator::css("tr").first()).await.unwrap(), 1);
        assert_eq!(page.count(&Locator::css("td")).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_strict_mode_violation() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements(
            "locator('li')",
            vec![ElementState::visible("a"), ElementState::visible("b")],
        );
        let page = page_with(&mock);
        let err = page.click(&Locator::css("li"), fast(true)).await.unwrap_err();
        assert!(matches!(err, BrowserError::StrictModeViolation { count: 2, .. }));
        assert!(mock.calls().is_empty());
    }

    #[tokio::test]
    async fn test_visible_filter_resolves_strictness() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements(
            "locator('li')",
            vec![ElementState::hidden("a"), ElementState::visible("b")],
        );
        let page = page_with(&mock);
        page.click(&Locator::css("li").visible(true), fast(true))
            .await
            .unwrap();
        assert_eq!(mock.calls(), vec!["click locator('li') #1"]);
    }

    #[tokio::test]
    async fn test_click_times_out_when_missing() {
        let mock = Arc::new(MockPage::new());
        let page = page_with(&mock);
        let err = page.click(&Locator::css("#nope"), fast(false)).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("30ms"));
    }

    #[tokio::test]
    async fn test_disabled_element_is_not_actionable() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements("locator('button')", vec![ElementState::visible("Go").disabled()]);
        let page = page_with(&mock);
        let err = page.click(&Locator::css("button"), fast(true)).await.unwrap_err();
        assert!(err.is_timeout());
    }

    #[tokio::test]
    async fn test_is_visible_semantics() {
        let mock = Arc::new(MockPage::new());
        mock.set_elements("getByText('x')", vec![ElementState::visible("x")]);
        mock.set_elements(
            "getByText('y')",
            vec![ElementState::visible("y"), ElementState::visible("y")],
        );
        let page = page_with(&mock);
        assert!(page.is_visible(&Locator::text("x")).await.unwrap());
        assert!(!page.is_visible(&Locator::text("z")).await.unwrap());
        assert!(page.is_visible(&Locator::text("y")).await.is_err());
        assert!(page.is_visible(&Locator::text("y").first()).await.unwrap());
    }

    #[tokio::test]
    async fn test_screenshot_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots/home.png");
        let mock = Arc::new(MockPage::new());
        let page = page_with(&mock);
        let written = page.screenshot(&path).await.unwrap();
        assert_eq!(written, std::fs::read(&path).unwrap().len());
    }
}
