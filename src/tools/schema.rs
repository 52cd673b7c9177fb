//! 工具 JSON Schema 生成（schemars）
//!
//! - `input_schema::<T>()`：由工具输入结构体生成 parameters schema（字段文档即描述）
//! - `tool_call_schema_json()`：「合法 tool call」的整体结构，可注入 system prompt

use std::collections::HashMap;

use schemars::gen::SchemaSettings;
use schemars::{schema_for, JsonSchema};
use serde_json::Value;

/// 工具调用请求格式：`{"tool": "...", "args": {...}}`（仅用于 Schema 生成）
#[allow(dead_code)]
#[derive(JsonSchema)]
struct ToolCallFormat {
    /// 工具名，如 navigate_browser、click_element、take_screenshot
    pub tool: String,
    /// 工具参数，依工具不同而不同（selector、text、url、path 等）
    pub args: HashMap<String, Value>,
}

/// 返回工具调用的 JSON Schema 字符串，可拼入 system prompt
pub fn tool_call_schema_json() -> String {
    let schema = schema_for!(ToolCallFormat);
    serde_json::to_string_pretty(&schema).unwrap_or_else(|_| String::new())
}

/// 输入结构体的扁平 schema（内联子 schema，去掉 $schema / title）
pub fn input_schema<T: JsonSchema>() -> Value {
    let generator = SchemaSettings::draft07()
        .with(|s| {
            s.inline_subschemas = true;
            s.option_add_null_type = false;
        })
        .into_generator();
    let root = generator.into_root_schema_for::<T>();
    let mut value = serde_json::to_value(root).unwrap_or_else(|_| serde_json::json!({"type": "object"}));
    if let Some(obj) = value.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
        obj.remove("definitions");
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[allow(dead_code)]
    #[derive(Deserialize, JsonSchema)]
    struct Demo {
        /// CSS selector
        selector: String,
        #[serde(default)]
        timeout_ms: Option<u64>,
    }

    #[test]
    fn test_input_schema_is_flat_object() {
        let schema = input_schema::<Demo>();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["selector"]["description"], "CSS selector");
        assert_eq!(schema["required"], serde_json::json!(["selector"]));
        assert!(schema.get("$schema").is_none());
        assert!(schema.get("title").is_none());
    }

    #[test]
    fn test_tool_call_schema_mentions_fields() {
        let json = tool_call_schema_json();
        assert!(json.contains("\"tool\""));
        assert!(json.contains("\"args\""));
    }
}
