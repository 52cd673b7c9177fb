//! iframe 内的工具：点击、按文本点击、断言隐藏、上传文件
//!
//! 定位器通过 `in_frame(iframe)` 限定在 iframe 文档内，其余行为与页面级工具一致。

use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::{js_string, Locator};
use crate::tools::click::{click_by_text, click_locator};
use crate::tools::context::{parse_args, require_non_empty};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IframeClickInput {
    /// CSS selector of the iframe element
    pub iframe: String,
    /// CSS selector of the element inside the iframe
    pub selector: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IframeClickByTextInput {
    /// CSS selector of the iframe element
    pub iframe: String,
    /// Role or CSS selector of the element inside the iframe
    pub selector: String,
    /// Text content of the element to click on
    pub text: String,
}

/// 单个路径或路径列表
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FileList {
    One(String),
    Many(Vec<String>),
}

impl FileList {
    fn into_vec(self) -> Vec<String> {
        match self {
            FileList::One(path) => vec![path],
            FileList::Many(paths) => paths,
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct IframeUploadInput {
    /// CSS selector of the iframe element
    pub iframe: String,
    /// CSS selector of the file input inside the iframe
    pub selector: String,
    /// Path (or list of paths) of the files to upload
    #[serde(alias = "file_path", alias = "path")]
    pub files: FileList,
}

pub struct IframeClickTool {
    ctx: BrowserContext,
}

impl IframeClickTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for IframeClickTool {
    fn name(&self) -> &str {
        "iframe_click"
    }

    fn description(&self) -> &str {
        "Click on an element with the given CSS selector inside an iframe"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<IframeClickInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: IframeClickInput = parse_args(self.name(), args)?;
        require_non_empty("iframe", &input.iframe)?;
        require_non_empty("selector", &input.selector)?;
        tracing::info!(iframe = %input.iframe, selector = %input.selector, "iframe_click tool execute");
        let locator = Locator::parse(&input.selector)
            .in_frame(&input.iframe)
            .visible(self.ctx.settings.visible_only);
        Ok(click_locator(&self.ctx, &locator, &input.selector, Some(&input.iframe)).await)
    }
}

pub struct IframeClickByTextTool {
    ctx: BrowserContext,
}

impl IframeClickByTextTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for IframeClickByTextTool {
    fn name(&self) -> &str {
        "iframe_click_by_text"
    }

    fn description(&self) -> &str {
        "Click on element inside an iframe matching the text content"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<IframeClickByTextInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: IframeClickByTextInput = parse_args(self.name(), args)?;
        require_non_empty("iframe", &input.iframe)?;
        require_non_empty("selector", &input.selector)?;
        require_non_empty("text", &input.text)?;
        tracing::info!(iframe = %input.iframe, selector = %input.selector, text = %input.text, "iframe_click_by_text tool execute");
        click_by_text(&self.ctx, Some(&input.iframe), &input.selector, &input.text).await
    }
}

pub struct IframeExpectHiddenTool {
    ctx: BrowserContext,
}

impl IframeExpectHiddenTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for IframeExpectHiddenTool {
    fn name(&self) -> &str {
        "iframe_expect_hidden"
    }

    fn description(&self) -> &str {
        "Check that the element with the given CSS selector inside an iframe is hidden or absent"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<IframeClickInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: IframeClickInput = parse_args(self.name(), args)?;
        require_non_empty("iframe", &input.iframe)?;
        require_non_empty("selector", &input.selector)?;
        tracing::info!(iframe = %input.iframe, selector = %input.selector, "iframe_expect_hidden tool execute");
        let locator = Locator::parse(&input.selector).in_frame(&input.iframe);
        let assertion = format!("expect({}).toBeHidden()", locator.to_playwright());
        match self.ctx.expect().to_be_hidden(&locator).await {
            Ok(()) => {
                self.ctx.recorder.record(&assertion).await;
                Ok(format!(
                    "Element '{}' inside iframe '{}' is hidden",
                    input.selector, input.iframe
                ))
            }
            Err(e) => {
                self.ctx.recorder.record_failure(&assertion).await;
                Ok(format!(
                    "Element '{}' inside iframe '{}' is not hidden with exception: {e}",
                    input.selector, input.iframe
                ))
            }
        }
    }
}

pub struct IframeUploadTool {
    ctx: BrowserContext,
}

impl IframeUploadTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for IframeUploadTool {
    fn name(&self) -> &str {
        "iframe_upload"
    }

    fn description(&self) -> &str {
        "Upload local files through a file input inside an iframe"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<IframeUploadInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: IframeUploadInput = parse_args(self.name(), args)?;
        require_non_empty("iframe", &input.iframe)?;
        require_non_empty("selector", &input.selector)?;
        let files = input.files.into_vec();
        if files.is_empty() {
            return Err("Missing files".to_string());
        }
        let mut resolved: Vec<PathBuf> = Vec::with_capacity(files.len());
        for file in &files {
            let path = tokio::fs::canonicalize(file)
                .await
                .map_err(|_| format!("File not found: {file}"))?;
            resolved.push(path);
        }
        tracing::info!(iframe = %input.iframe, selector = %input.selector, files = ?files, "iframe_upload tool execute");

        let locator = Locator::parse(&input.selector).in_frame(&input.iframe);
        match self
            .ctx
            .page
            .set_input_files(&locator, &resolved, self.ctx.settings.action_options())
            .await
        {
            Ok(()) => {
                let quoted: Vec<String> = files.iter().map(|f| js_string(f)).collect();
                self.ctx
                    .recorder
                    .record(&format!(
                        "{}.setInputFiles([{}])",
                        locator.to_playwright(),
                        quoted.join(", ")
                    ))
                    .await;
                Ok(format!(
                    "Uploaded {} file(s) to '{}' inside iframe '{}'",
                    files.len(),
                    input.selector,
                    input.iframe
                ))
            }
            Err(e) => Ok(format!(
                "Unable to upload files to '{}' inside iframe '{}' with exception: {e}",
                input.selector, input.iframe
            )),
        }
    }
}
