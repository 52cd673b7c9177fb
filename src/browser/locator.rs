//! 元素定位器
//!
//! Locator = 可选 iframe 选择器 + 链式选择步骤（CSS / XPath / Role / Text / TestId / HasText）
//! + 两个修饰：`visible_only`（只保留可见元素）与 `first`（取第一个匹配，关闭严格模式）。
//!
//! 同一个 Locator 既交给驱动解析（序列化为 JSON 注入页面脚本），
//! 也渲染为 Playwright 语句写入录制文件（如 `page.getByRole('button').getByText('OK')`）。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 单个选择步骤；链式步骤在上一步匹配到的元素内部继续查找
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Selector {
    Css { value: String },
    #[serde(rename = "xpath")]
    XPath { value: String },
    Role { role: String },
    /// exact=false：忽略大小写的子串匹配；exact=true：规整空白后全等
    Text { text: String, exact: bool },
    TestId { id: String },
    /// CSS 匹配且文本包含 text（Playwright 的 `:has-text()`）
    HasText { css: String, text: String },
}

impl Selector {
    /// 解析 Agent 传入的选择器字符串：`text=` / `xpath=` / `//` / `data-testid=` 前缀，其余视为 CSS
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if let Some(rest) = raw.strip_prefix("text=") {
            return match unquote(rest) {
                Some(inner) => Selector::Text {
                    text: inner.to_string(),
                    exact: true,
                },
                None => Selector::Text {
                    text: rest.to_string(),
                    exact: false,
                },
            };
        }
        if let Some(rest) = raw.strip_prefix("xpath=") {
            return Selector::XPath {
                value: rest.to_string(),
            };
        }
        if raw.starts_with("//") || raw.starts_with("(//") {
            return Selector::XPath {
                value: raw.to_string(),
            };
        }
        if let Some(rest) = raw.strip_prefix("data-testid=") {
            return Selector::TestId {
                id: unquote(rest).unwrap_or(rest).to_string(),
            };
        }
        Selector::Css {
            value: raw.to_string(),
        }
    }

    fn render(&self) -> String {
        match self {
            Selector::Css { value } => format!("locator({})", js_string(value)),
            Selector::XPath { value } => format!("locator({})", js_string(&format!("xpath={value}"))),
            Selector::Role { role } => format!("getByRole({})", js_string(role)),
            Selector::Text { text, exact: false } => format!("getByText({})", js_string(text)),
            Selector::Text { text, exact: true } => {
                format!("getByText({}, {{ exact: true }})", js_string(text))
            }
            Selector::TestId { id } => format!("getByTestId({})", js_string(id)),
            Selector::HasText { css, text } => {
                format!("locator({}, {{ hasText: {} }})", js_string(css), js_string(text))
            }
        }
    }
}

fn unquote(s: &str) -> Option<&str> {
    let s = s.trim();
    if s.len() >= 2
        && ((s.starts_with('"') && s.ends_with('"')) || (s.starts_with('\'') && s.ends_with('\'')))
    {
        Some(&s[1..s.len() - 1])
    } else {
        None
    }
}

/// 定位器：iframe 作用域 + 选择步骤链 + 修饰
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    pub frame: Option<String>,
    pub steps: Vec<Selector>,
    pub visible_only: bool,
    pub first: bool,
}

impl Locator {
    fn single(step: Selector) -> Self {
        Self {
            steps: vec![step],
            ..Self::default()
        }
    }

    pub fn parse(selector: &str) -> Self {
        Self::single(Selector::parse(selector))
    }

    pub fn css(selector: impl Into<String>) -> Self {
        Self::single(Selector::Css {
            value: selector.into(),
        })
    }

    pub fn role(role: impl Into<String>) -> Self {
        Self::single(Selector::Role { role: role.into() })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Self::single(Selector::Text {
            text: text.into(),
            exact: false,
        })
    }

    pub fn test_id(id: impl Into<String>) -> Self {
        Self::single(Selector::TestId { id: id.into() })
    }

    pub fn has_text(css: impl Into<String>, text: impl Into<String>) -> Self {
        Self::single(Selector::HasText {
            css: css.into(),
            text: text.into(),
        })
    }

    /// 在当前匹配结果内部按文本继续查找
    pub fn get_by_text(mut self, text: impl Into<String>) -> Self {
        self.steps.push(Selector::Text {
            text: text.into(),
            exact: false,
        });
        self
    }

    /// 限定在 iframe（由 frame 选择器指定）的文档内查找
    pub fn in_frame(mut self, frame: impl Into<String>) -> Self {
        self.frame = Some(frame.into());
        self
    }

    pub fn visible(mut self, visible_only: bool) -> Self {
        self.visible_only = visible_only;
        self
    }

    pub fn first(mut self) -> Self {
        self.first = true;
        self
    }

    /// 不含修饰的描述（也是 MockPage 的查找键），如 `frameLocator('#f').locator('input')`
    pub fn describe(&self) -> String {
        let mut parts = Vec::with_capacity(self.steps.len() + 1);
        if let Some(frame) = &self.frame {
            parts.push(format!("frameLocator({})", js_string(frame)));
        }
        parts.extend(self.steps.iter().map(Selector::render));
        parts.join(".")
    }

    /// 完整的 Playwright 表达式（含 `page.` 前缀与修饰），用于录制脚本
    pub fn to_playwright(&self) -> String {
        let mut expr = format!("page.{}", self.describe());
        if self.visible_only {
            expr.push_str(".filter({ visible: true })");
        }
        if self.first {
            expr.push_str(".first()");
        }
        expr
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}

/// 转为单引号 JS 字符串字面量
pub fn js_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_prefixes() {
        assert_eq!(
            Selector::parse("#submit"),
            Selector::Css {
                value: "#submit".into()
            }
        );
        assert_eq!(
            Selector::parse("text=Sign in"),
            Selector::Text {
                text: "Sign in".into(),
                exact: false
            }
        );
        assert_eq!(
            Selector::parse("text=\"Sign in\""),
            Selector::Text {
                text: "Sign in".into(),
                exact: true
            }
        );
        assert_eq!(
            Selector::parse("//div[@id='a']"),
            Selector::XPath {
                value: "//div[@id='a']".into()
            }
        );
        assert_eq!(
            Selector::parse("xpath=//a"),
            Selector::XPath { value: "//a".into() }
        );
        assert_eq!(
            Selector::parse("data-testid='login'"),
            Selector::TestId { id: "login".into() }
        );
    }

    #[test]
    fn test_describe_chain_and_frame() {
        let loc = Locator::role("button").get_by_text("OK");
        assert_eq!(loc.describe(), "getByRole('button').getByText('OK')");

        let loc = Locator::parse("input[type=file]").in_frame("#upload-frame");
        assert_eq!(
            loc.to_string(),
            "frameLocator('#upload-frame').locator('input[type=file]')"
        );
    }

    #[test]
    fn test_to_playwright_modifiers() {
        let loc = Locator::css("a.nav").visible(true);
        assert_eq!(
            loc.to_playwright(),
            "page.locator('a.nav').filter({ visible: true })"
        );
        let loc = Locator::text("Welcome").first();
        assert_eq!(loc.to_playwright(), "page.getByText('Welcome').first()");
        let loc = Locator::has_text("li", "Milk");
        assert_eq!(loc.to_playwright(), "page.locator('li', { hasText: 'Milk' })");
    }

    #[test]
    fn test_js_string_escaping() {
        assert_eq!(js_string("it's"), r"'it\'s'");
        assert_eq!(js_string("a\\b\nc"), r"'a\\b\nc'");
    }

    #[test]
    fn test_serializes_for_driver() {
        let loc = Locator::test_id("save").in_frame("iframe");
        let json = serde_json::to_value(&loc).unwrap();
        assert_eq!(json["frame"], "iframe");
        assert_eq!(json["steps"][0]["kind"], "test_id");
        assert_eq!(json["steps"][0]["id"], "save");
    }
}
