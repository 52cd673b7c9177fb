//! take_screenshot：截取当前视口并保存为 PNG

use std::path::PathBuf;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::js_string;
use crate::tools::context::{parse_args, require_non_empty};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ScreenshotInput {
    /// File path where the PNG screenshot is saved
    pub path: String,
}

pub struct TakeScreenshotTool {
    ctx: BrowserContext,
}

impl TakeScreenshotTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for TakeScreenshotTool {
    fn name(&self) -> &str {
        "take_screenshot"
    }

    fn description(&self) -> &str {
        "Take a screenshot of the current web page and save it to the given path"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ScreenshotInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ScreenshotInput = parse_args(self.name(), args)?;
        require_non_empty("path", &input.path)?;
        let path = PathBuf::from(&input.path);
        match self.ctx.page.screenshot(&path).await {
            Ok(bytes) => {
                tracing::info!(path = %path.display(), bytes, "take_screenshot tool execute");
                self.ctx
                    .recorder
                    .record(&format!("page.screenshot({{ path: {} }})", js_string(&input.path)))
                    .await;
                Ok("Screenshot taken".to_string())
            }
            Err(e) => Ok(format!("Unable to take screenshot with exception: {e}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Fixture;
    use serde_json::json;

    #[tokio::test]
    async fn test_screenshot_writes_png_and_records() {
        let fx = Fixture::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shots").join("home.png");
        let tool = TakeScreenshotTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"path": path.display().to_string()}))
            .await
            .unwrap();
        assert_eq!(out, "Screenshot taken");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
        let recorded = fx.recorded().await;
        assert_eq!(recorded.len(), 1);
        assert!(recorded[0].starts_with("    await page.screenshot({ path: '"));
    }

    #[tokio::test]
    async fn test_screenshot_failure_message() {
        let fx = Fixture::new();
        fx.mock.fail_screenshot("target closed");
        let tool = TakeScreenshotTool::new(fx.ctx.clone());
        let out = tool.execute(json!({"path": "out.png"})).await.unwrap();
        assert_eq!(
            out,
            "Unable to take screenshot with exception: screenshot failed: target closed"
        );
        assert!(fx.recorded().await.is_empty());
    }
}
