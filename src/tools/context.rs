//! 浏览器工具共享上下文
//!
//! 所有浏览器工具持有同一个 BrowserContext：页面句柄、脚本录制器与工具设置。

use std::sync::Arc;
use std::time::Duration;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::{ActionOptions, Expect, Page};
use crate::config::ToolsSection;
use crate::recorder::ScriptRecorder;

/// 工具行为设置（来自 [tools] 配置段）
#[derive(Debug, Clone)]
pub struct ToolSettings {
    pub action_timeout: Duration,
    pub expect_timeout: Duration,
    pub visible_only: bool,
    pub strict: bool,
    pub max_result_chars: usize,
    pub allowed_domains: Vec<String>,
}

impl ToolSettings {
    pub fn from_config(section: &ToolsSection) -> Self {
        Self {
            action_timeout: Duration::from_millis(section.action_timeout_ms),
            expect_timeout: Duration::from_millis(section.expect_timeout_ms),
            visible_only: section.visible_only,
            strict: section.strict,
            max_result_chars: section.max_result_chars,
            allowed_domains: section
                .allowed_domains
                .iter()
                .map(|d| d.trim().to_lowercase())
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn action_options(&self) -> ActionOptions {
        ActionOptions::new(self.action_timeout, self.strict)
    }
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self::from_config(&ToolsSection::default())
    }
}

#[derive(Clone)]
pub struct BrowserContext {
    pub page: Arc<Page>,
    pub recorder: Arc<ScriptRecorder>,
    pub settings: ToolSettings,
}

impl BrowserContext {
    pub fn new(page: Arc<Page>, recorder: Arc<ScriptRecorder>, settings: ToolSettings) -> Self {
        Self {
            page,
            recorder,
            settings,
        }
    }

    pub fn expect(&self) -> Expect<'_> {
        Expect::new(&self.page, self.settings.expect_timeout)
    }

    /// 超过 max_result_chars 时截断（按字符）
    pub fn truncate(&self, text: String) -> String {
        let max_chars = self.settings.max_result_chars;
        if text.chars().count() > max_chars {
            text.chars().take(max_chars).collect::<String>() + "\n...[truncated]"
        } else {
            text
        }
    }
}

/// 解析工具参数；null 视为空对象（无参数工具）
pub(crate) fn parse_args<T: DeserializeOwned>(tool: &str, args: Value) -> Result<T, String> {
    let args = if args.is_null() {
        Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| format!("Invalid arguments for {tool}: {e}"))
}

pub(crate) fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("Missing {field}"))
    } else {
        Ok(())
    }
}

/// 无参数工具的输入
#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct NoInput {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    struct Sel {
        selector: String,
    }

    #[test]
    fn test_parse_args() {
        let sel: Sel = parse_args("click_element", json!({"selector": "#a", "extra": 1})).unwrap();
        assert_eq!(sel.selector, "#a");
        let err = parse_args::<Sel>("click_element", json!({})).unwrap_err();
        assert!(err.starts_with("Invalid arguments for click_element: missing field `selector`"));
        parse_args::<NoInput>("current_webpage", Value::Null).unwrap();
    }

    #[test]
    fn test_settings_from_config() {
        let section = ToolsSection {
            allowed_domains: vec![" Example.COM ".into(), "".into()],
            ..ToolsSection::default()
        };
        let settings = ToolSettings::from_config(&section);
        assert_eq!(settings.allowed_domains, vec!["example.com"]);
        assert_eq!(settings.action_options().timeout, Duration::from_millis(1_000));
        assert!(!settings.action_options().strict);
    }
}
