//! 断言工具：expect_test_id / expect_text / expect_title
//!
//! 断言成功录制 `expect(...)` 语句；失败录制 `// FAIL - ...` 注释行，并把失败原因返回给 LLM。

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::{BrowserError, Locator, TextMatch};
use crate::tools::context::{parse_args, require_non_empty};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExpectTestIdInput {
    /// Value of the data-testid attribute expected to be visible
    pub test_id: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExpectTextInput {
    /// Text you expect to see on the current page
    pub text: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExpectTitleInput {
    /// Expected page title; wrap in slashes (/.../) to match a regular expression
    pub title: String,
}

/// 录制断言结果：成功写语句，失败写 FAIL 注释
async fn record_assertion(ctx: &BrowserContext, assertion: &str, result: &Result<(), BrowserError>) {
    match result {
        Ok(()) => ctx.recorder.record(assertion).await,
        Err(_) => ctx.recorder.record_failure(assertion).await,
    }
}

pub struct ExpectTestIdTool {
    ctx: BrowserContext,
}

impl ExpectTestIdTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExpectTestIdTool {
    fn name(&self) -> &str {
        "expect_test_id"
    }

    fn description(&self) -> &str {
        "Check that the element with the given data-testid is visible on the current web page"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ExpectTestIdInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ExpectTestIdInput = parse_args(self.name(), args)?;
        require_non_empty("test_id", &input.test_id)?;
        tracing::info!(test_id = %input.test_id, "expect_test_id tool execute");
        let locator = Locator::test_id(&input.test_id);
        let assertion = format!("expect({}).toBeVisible()", locator.to_playwright());
        let result = self.ctx.expect().to_be_visible(&locator).await;
        record_assertion(&self.ctx, &assertion, &result).await;
        Ok(match result {
            Ok(()) => format!("Element with test id '{}' is visible", input.test_id),
            Err(e) => format!("Cannot find test id '{}' with exception: {e}", input.test_id),
        })
    }
}

pub struct ExpectTextTool {
    ctx: BrowserContext,
}

impl ExpectTextTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExpectTextTool {
    fn name(&self) -> &str {
        "expect_text"
    }

    fn description(&self) -> &str {
        "Check if expected text is the same as the text of the current web page."
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ExpectTextInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ExpectTextInput = parse_args(self.name(), args)?;
        require_non_empty("text", &input.text)?;
        tracing::info!(text = %input.text, "expect_text tool execute");
        let locator = Locator::text(&input.text).first();
        let expected = TextMatch::Contains(input.text.clone());
        let assertion = format!(
            "expect({}).toContainText({})",
            locator.to_playwright(),
            expected.to_playwright()
        );
        let result = self.ctx.expect().to_have_text(&locator, &expected).await;
        record_assertion(&self.ctx, &assertion, &result).await;
        Ok(match result {
            Ok(()) => format!("Text: '{}' is visible on the current page.", input.text),
            Err(e) => format!("Cannot find '{}' with exception: {e}", input.text),
        })
    }
}

pub struct ExpectTitleTool {
    ctx: BrowserContext,
}

impl ExpectTitleTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ExpectTitleTool {
    fn name(&self) -> &str {
        "expect_title"
    }

    fn description(&self) -> &str {
        "Check that the title of the current web page matches the expected title"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ExpectTitleInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ExpectTitleInput = parse_args(self.name(), args)?;
        require_non_empty("title", &input.title)?;
        let expected = TextMatch::parse(&input.title)
            .map_err(|e| format!("Invalid title pattern '{}': {e}", input.title))?;
        tracing::info!(title = %input.title, "expect_title tool execute");
        let assertion = format!("expect(page).toHaveTitle({})", expected.to_playwright());
        let result = self.ctx.expect().to_have_title(&expected).await;
        record_assertion(&self.ctx, &assertion, &result).await;
        Ok(match result {
            Ok(()) => format!("Page title is '{}'", input.title),
            Err(e) => format!("Page title does not match '{}' with exception: {e}", input.title),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ElementState;
    use crate::tools::testing::Fixture;
    use serde_json::json;

    #[tokio::test]
    async fn test_expect_text_pass_and_fail() {
        let fx = Fixture::new();
        fx.mock.set_elements(
            "getByText('Order placed')",
            vec![
                ElementState::visible("Order placed #42"),
                ElementState::visible("Order placed"),
            ],
        );
        let tool = ExpectTextTool::new(fx.ctx.clone());
        assert_eq!(
            tool.execute(json!({"text": "Order placed"})).await.unwrap(),
            "Text: 'Order placed' is visible on the current page."
        );
        let out = tool.execute(json!({"text": "Refunded"})).await.unwrap();
        assert!(out.starts_with("Cannot find 'Refunded' with exception: expectation failed"));
        assert_eq!(
            fx.recorded().await,
            vec![
                "    await expect(page.getByText('Order placed').first()).toContainText('Order placed');",
                "    // FAIL - expect(page.getByText('Refunded').first()).toContainText('Refunded')",
            ]
        );
    }

    #[tokio::test]
    async fn test_expect_test_id() {
        let fx = Fixture::new();
        fx.mock
            .set_elements("getByTestId('cart-badge')", vec![ElementState::visible("3")]);
        let tool = ExpectTestIdTool::new(fx.ctx.clone());
        assert_eq!(
            tool.execute(json!({"test_id": "cart-badge"})).await.unwrap(),
            "Element with test id 'cart-badge' is visible"
        );
        let out = tool.execute(json!({"test_id": "toast"})).await.unwrap();
        assert!(out.starts_with("Cannot find test id 'toast' with exception:"));
    }

    #[tokio::test]
    async fn test_expect_title_literal_and_pattern() {
        let fx = Fixture::new();
        fx.mock.set_title("Dashboard - Acme");
        let tool = ExpectTitleTool::new(fx.ctx.clone());
        assert_eq!(
            tool.execute(json!({"title": "Dashboard - Acme"})).await.unwrap(),
            "Page title is 'Dashboard - Acme'"
        );
        assert_eq!(
            tool.execute(json!({"title": "/^Dash/"})).await.unwrap(),
            "Page title is '/^Dash/'"
        );
        let out = tool.execute(json!({"title": "Login"})).await.unwrap();
        assert!(out.starts_with("Page title does not match 'Login'"));
        assert!(tool.execute(json!({"title": "/[/"})).await.is_err());
        assert_eq!(
            fx.recorded().await,
            vec![
                "    await expect(page).toHaveTitle('Dashboard - Acme');",
                "    await expect(page).toHaveTitle(/^Dash/);",
                "    // FAIL - expect(page).toHaveTitle('Login')",
            ]
        );
    }

    #[tokio::test]
    async fn test_expect_title_pattern_with_slash_records_valid_literal() {
        let fx = Fixture::new();
        fx.mock.set_title("Docs/Home");
        let tool = ExpectTitleTool::new(fx.ctx.clone());
        assert_eq!(
            tool.execute(json!({"title": "/Docs/Home/"})).await.unwrap(),
            "Page title is '/Docs/Home/'"
        );
        assert_eq!(
            fx.recorded().await,
            vec![r"    await expect(page).toHaveTitle(/Docs\/Home/);"]
        );
    }
}
