//! fill_element：向输入框填入文本

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::{js_string, Locator};
use crate::tools::context::{parse_args, require_non_empty};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct FillInput {
    /// CSS selector of the input element to fill
    pub selector: String,
    /// Text value to fill into the element
    pub value: String,
}

pub struct FillTool {
    ctx: BrowserContext,
}

impl FillTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for FillTool {
    fn name(&self) -> &str {
        "fill_element"
    }

    fn description(&self) -> &str {
        "Fill an input element with the given CSS selector with a text value"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<FillInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: FillInput = parse_args(self.name(), args)?;
        require_non_empty("selector", &input.selector)?;
        tracing::info!(selector = %input.selector, "fill tool execute");
        let locator = Locator::parse(&input.selector).visible(self.ctx.settings.visible_only);
        match self
            .ctx
            .page
            .fill(&locator, &input.value, self.ctx.settings.action_options())
            .await
        {
            Ok(()) => {
                self.ctx
                    .recorder
                    .record(&format!(
                        "{}.fill({})",
                        locator.to_playwright(),
                        js_string(&input.value)
                    ))
                    .await;
                Ok(format!("Filled element '{}'", input.selector))
            }
            Err(e) => Ok(format!(
                "Unable to fill element '{}' with exception: {e}",
                input.selector
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ElementState;
    use crate::tools::testing::Fixture;
    use serde_json::json;

    #[tokio::test]
    async fn test_fill_records_value() {
        let fx = Fixture::new();
        fx.mock.set_elements(
            "locator('#email')",
            vec![ElementState::visible("").with_tag("input")],
        );
        let tool = FillTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"selector": "#email", "value": "o'neil@example.com"}))
            .await
            .unwrap();
        assert_eq!(out, "Filled element '#email'");
        assert_eq!(
            fx.mock.calls(),
            vec!["fill locator('#email') #0 = o'neil@example.com"]
        );
        assert_eq!(
            fx.recorded().await,
            vec![r"    await page.locator('#email').filter({ visible: true }).fill('o\'neil@example.com');"]
        );
    }

    #[tokio::test]
    async fn test_fill_disabled_input_times_out() {
        let fx = Fixture::new();
        fx.mock.set_elements(
            "locator('#locked')",
            vec![ElementState::visible("").disabled()],
        );
        let tool = FillTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"selector": "#locked", "value": "x"}))
            .await
            .unwrap();
        assert!(out.starts_with("Unable to fill element '#locked' with exception: Timeout 30ms exceeded"));
        assert!(fx.recorded().await.is_empty());
    }

    #[tokio::test]
    async fn test_fill_driver_failure() {
        let fx = Fixture::new();
        fx.mock
            .set_elements("locator('#q')", vec![ElementState::visible("")]);
        fx.mock.fail_fill("locator('#q')", "element is not an <input>");
        let tool = FillTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"selector": "#q", "value": "rust"}))
            .await
            .unwrap();
        assert!(out.contains("element is not an <input>"));
    }
}
