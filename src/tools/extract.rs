//! 读取页面内容的工具：extract_text / extract_hyperlinks / get_elements
//!
//! 这些工具只读页面，不录制脚本步骤。

use std::collections::BTreeSet;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::browser::Locator;
use crate::tools::context::{parse_args, require_non_empty, NoInput};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

/// html2text 的换行宽度
const TEXT_WIDTH: usize = 120;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ExtractHyperlinksInput {
    /// Return absolute URLs instead of relative URLs
    #[serde(default)]
    pub absolute_urls: bool,
}

fn default_attributes() -> Vec<String> {
    vec!["innerText".to_string()]
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetElementsInput {
    /// CSS selector, such as '*', 'div', 'p', 'a', #id, .classname
    pub selector: String,
    /// Set of attributes to retrieve for each element
    #[serde(default = "default_attributes")]
    pub attributes: Vec<String>,
}

pub struct ExtractTextTool {
    ctx: BrowserContext,
}

impl ExtractTextTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExtractTextTool {
    fn name(&self) -> &str {
        "extract_text"
    }

    fn description(&self) -> &str {
        "Extract all the text on the current webpage"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<NoInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let _: NoInput = parse_args(self.name(), args)?;
        let html = self.ctx.page.content().await.map_err(|e| e.to_string())?;
        let text = html2text::from_read(html.as_bytes(), TEXT_WIDTH).unwrap_or_else(|_| html);
        tracing::info!(chars = text.len(), "extract_text tool execute");
        Ok(self.ctx.truncate(text.trim().to_string()))
    }
}

pub struct ExtractHyperlinksTool {
    ctx: BrowserContext,
}

impl ExtractHyperlinksTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExtractHyperlinksTool {
    fn name(&self) -> &str {
        "extract_hyperlinks"
    }

    fn description(&self) -> &str {
        "Extract all hyperlinks on the current webpage"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ExtractHyperlinksInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ExtractHyperlinksInput = parse_args(self.name(), args)?;
        let anchors = self
            .ctx
            .page
            .elements(&Locator::css("a[href]"))
            .await
            .map_err(|e| e.to_string())?;
        let base = if input.absolute_urls {
            let current = self.ctx.page.url().await.map_err(|e| e.to_string())?;
            Some(Url::parse(&current).map_err(|e| format!("Invalid page URL '{current}': {e}"))?)
        } else {
            None
        };

        let links: BTreeSet<String> = anchors
            .iter()
            .filter_map(|a| a.attributes.get("href"))
            .filter(|href| !href.trim().is_empty())
            .map(|href| match &base {
                Some(base) => base
                    .join(href)
                    .map(String::from)
                    .unwrap_or_else(|_| href.clone()),
                None => href.clone(),
            })
            .collect();
        tracing::info!(count = links.len(), "extract_hyperlinks tool execute");
        let json = serde_json::to_string(&links).map_err(|e| e.to_string())?;
        Ok(self.ctx.truncate(json))
    }
}

pub struct GetElementsTool {
    ctx: BrowserContext,
}

impl GetElementsTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for GetElementsTool {
    fn name(&self) -> &str {
        "get_elements"
    }

    fn description(&self) -> &str {
        "Retrieve elements in the current web page matching the given CSS selector"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<GetElementsInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: GetElementsInput = parse_args(self.name(), args)?;
        require_non_empty("selector", &input.selector)?;
        let elements = self
            .ctx
            .page
            .elements(&Locator::parse(&input.selector))
            .await
            .map_err(|e| e.to_string())?;
        tracing::info!(selector = %input.selector, count = elements.len(), "get_elements tool execute");

        let results: Vec<Value> = elements
            .iter()
            .filter_map(|element| {
                let mut fields = Map::new();
                for attribute in &input.attributes {
                    let value = if attribute == "innerText" {
                        Some(element.text.as_str())
                    } else {
                        element.attributes.get(attribute).map(String::as_str)
                    };
                    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
                        fields.insert(attribute.clone(), Value::String(value.to_string()));
                    }
                }
                (!fields.is_empty()).then_some(Value::Object(fields))
            })
            .collect();
        let json = serde_json::to_string(&results).map_err(|e| e.to_string())?;
        Ok(self.ctx.truncate(json))
    }
}
