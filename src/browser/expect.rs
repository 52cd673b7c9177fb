//! 轮询断言（对应 Playwright 的 `expect(...)`）
//!
//! 每个断言在超时内反复检查，满足即返回；超时返回 `BrowserError::ExpectationFailed`，
//! 其中附带最后一次检查的实际值。严格模式冲突立即返回。

use std::future::Future;
use std::time::Duration;

use regex::Regex;
use tokio::time::{sleep, Instant};

use crate::browser::{BrowserError, Locator, Page};

/// 断言默认超时（与 Playwright 一致）
pub const DEFAULT_EXPECT_TIMEOUT: Duration = Duration::from_secs(5);

/// 文本匹配方式
#[derive(Debug, Clone)]
pub enum TextMatch {
    /// 规整空白后全等
    Exact(String),
    /// 规整空白后包含
    Contains(String),
    Pattern(Regex),
}

impl TextMatch {
    /// `/pattern/` 形式解析为正则，否则为全等匹配
    pub fn parse(raw: &str) -> Result<Self, regex::Error> {
        if raw.len() >= 2 && raw.starts_with('/') && raw.ends_with('/') {
            Ok(TextMatch::Pattern(Regex::new(&raw[1..raw.len() - 1])?))
        } else {
            Ok(TextMatch::Exact(raw.to_string()))
        }
    }

    pub fn matches(&self, actual: &str) -> bool {
        let actual = normalize_whitespace(actual);
        match self {
            TextMatch::Exact(expected) => actual == normalize_whitespace(expected),
            TextMatch::Contains(expected) => actual.contains(&normalize_whitespace(expected)),
            TextMatch::Pattern(re) => re.is_match(&actual),
        }
    }

    /// Playwright 参数形式：字符串字面量或正则字面量
    pub fn to_playwright(&self) -> String {
        match self {
            TextMatch::Exact(s) | TextMatch::Contains(s) => crate::browser::js_string(s),
            TextMatch::Pattern(re) => format!("/{}/", escape_slashes(re.as_str())),
        }
    }
}

/// 正则字面量中未转义的 `/` 需写成 `\/`
fn escape_slashes(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut escaped = false;
    for c in pattern.chars() {
        if c == '/' && !escaped {
            out.push('\\');
        }
        escaped = c == '\\' && !escaped;
        out.push(c);
    }
    out
}

pub fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

enum Check {
    Pass,
    Retry(String),
}

pub struct Expect<'a> {
    page: &'a Page,
    timeout: Duration,
}

impl<'a> Expect<'a> {
    pub fn new(page: &'a Page, timeout: Duration) -> Self {
        Self { page, timeout }
    }

    async fn poll<F, Fut>(&self, assertion: String, mut check: F) -> Result<(), BrowserError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Check, BrowserError>>,
    {
        let deadline = Instant::now() + self.timeout;
        loop {
            let detail = match check().await? {
                Check::Pass => return Ok(()),
                Check::Retry(detail) => detail,
            };
            let now = Instant::now();
            if now >= deadline {
                return Err(BrowserError::ExpectationFailed {
                    assertion,
                    detail: format!(
                        "timed out after {}ms: {detail}",
                        self.timeout.as_millis()
                    ),
                });
            }
            sleep(self.page.poll_interval().min(deadline - now)).await;
        }
    }

    fn strict(locator: &Locator, count: usize) -> BrowserError {
        BrowserError::StrictModeViolation {
            locator: locator.to_string(),
            count,
        }
    }

    pub async fn to_have_text(&self, locator: &Locator, expected: &TextMatch) -> Result<(), BrowserError> {
        let method = match expected {
            TextMatch::Contains(_) => "toContainText",
            _ => "toHaveText",
        };
        let assertion = format!(
            "expect({}).{method}({})",
            locator.to_playwright(),
            expected.to_playwright()
        );
        let page = self.page;
        self.poll(assertion, || async move {
            let matched = page.matches(locator).await?;
            match matched.as_slice() {
                [] => Ok(Check::Retry("element not found".to_string())),
                [(_, state)] if expected.matches(&state.text) => Ok(Check::Pass),
                [(_, state)] => Ok(Check::Retry(format!("actual text '{}'", state.text))),
                _ => Err(Self::strict(locator, matched.len())),
            }
        })
        .await
    }

    pub async fn to_have_title(&self, expected: &TextMatch) -> Result<(), BrowserError> {
        let assertion = format!("expect(page).toHaveTitle({})", expected.to_playwright());
        let page = self.page;
        self.poll(assertion, || async move {
            let title = page.title().await?;
            if expected.matches(&title) {
                Ok(Check::Pass)
            } else {
                Ok(Check::Retry(format!("actual title '{title}'")))
            }
        })
        .await
    }

    pub async fn to_be_visible(&self, locator: &Locator) -> Result<(), BrowserError> {
        let assertion = format!("expect({}).toBeVisible()", locator.to_playwright());
        let page = self.page;
        self.poll(assertion, || async move {
            let matched = page.matches(locator).await?;
            match matched.as_slice() {
                [] => Ok(Check::Retry("element not found".to_string())),
                [(_, state)] if state.visible => Ok(Check::Pass),
                [_] => Ok(Check::Retry("element is hidden".to_string())),
                _ => Err(Self::strict(locator, matched.len())),
            }
        })
        .await
    }

    /// 无匹配或唯一匹配不可见即通过
    pub async fn to_be_hidden(&self, locator: &Locator) -> Result<(), BrowserError> {
        let assertion = format!("expect({}).toBeHidden()", locator.to_playwright());
        let page = self.page;
        self.poll(assertion, || async move {
            let matched = page.matches(locator).await?;
            match matched.as_slice() {
                [] => Ok(Check::Pass),
                [(_, state)] if !state.visible => Ok(Check::Pass),
                [_] => Ok(Check::Retry("element is visible".to_string())),
                _ => Err(Self::strict(locator, matched.len())),
            }
        })
        .await
    }
}
