//! 导航工具：navigate_browser / previous_webpage / current_webpage

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::browser::js_string;
use crate::tools::context::{parse_args, NoInput};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct NavigateInput {
    /// URL to navigate to (http or https)
    pub url: String,
}

/// 校验 URL：必须是 http(s)，白名单非空时域名须在其中
fn validate_url(raw: &str, allowed_domains: &[String]) -> Result<Url, String> {
    let url = Url::parse(raw.trim()).map_err(|e| format!("Invalid URL '{raw}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("URL scheme must be 'http' or 'https'".to_string());
    }
    if allowed_domains.is_empty() {
        return Ok(url);
    }
    let host = url
        .host_str()
        .map(str::to_lowercase)
        .ok_or_else(|| format!("URL has no host: {raw}"))?;
    if allowed_domains.iter().any(|d| d == &host) {
        Ok(url)
    } else {
        Err(format!("Domain not in allowlist: {host}"))
    }
}

pub struct NavigateTool {
    ctx: BrowserContext,
}

impl NavigateTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for NavigateTool {
    fn name(&self) -> &str {
        "navigate_browser"
    }

    fn description(&self) -> &str {
        "Navigate a browser to the specified URL"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<NavigateInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: NavigateInput = parse_args(self.name(), args)?;
        let parsed = validate_url(&input.url, &self.ctx.settings.allowed_domains)?;
        let url = input.url.trim();
        tracing::info!(url = %parsed, "navigate tool execute");
        match self.ctx.page.goto(parsed.as_str()).await {
            Ok(status) => {
                self.ctx
                    .recorder
                    .record(&format!("page.goto({})", js_string(parsed.as_str())))
                    .await;
                Ok(match status {
                    Some(code) => format!("Navigating to {url} returned status code {code}"),
                    None => format!("Navigating to {url} completed"),
                })
            }
            Err(e) => Ok(format!("Unable to navigate to {url} with exception: {e}")),
        }
    }
}

pub struct NavigateBackTool {
    ctx: BrowserContext,
}

impl NavigateBackTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for NavigateBackTool {
    fn name(&self) -> &str {
        "previous_webpage"
    }

    fn description(&self) -> &str {
        "Navigate back to the previous page in the browser history"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<NoInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let _: NoInput = parse_args(self.name(), args)?;
        tracing::info!("previous_webpage tool execute");
        match self.ctx.page.go_back().await {
            Ok(Some(entry)) => {
                self.ctx.recorder.record("page.goBack()").await;
                let status = entry
                    .status
                    .map(|code| code.to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Ok(format!(
                    "Navigated back to the previous page with URL '{}'. Status code {status}",
                    entry.url
                ))
            }
            Ok(None) => Ok("Unable to navigate back; no previous page in the history".to_string()),
            Err(e) => Ok(format!("Unable to navigate back with exception: {e}")),
        }
    }
}

pub struct CurrentWebPageTool {
    ctx: BrowserContext,
}

impl CurrentWebPageTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for CurrentWebPageTool {
    fn name(&self) -> &str {
        "current_webpage"
    }

    fn description(&self) -> &str {
        "Returns the URL of the current page"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<NoInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let _: NoInput = parse_args(self.name(), args)?;
        self.ctx.page.url().await.map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::Fixture;
    use serde_json::json;

    #[test]
    fn test_validate_url() {
        assert!(validate_url("https://example.com/a", &[]).is_ok());
        assert_eq!(
            validate_url("file:///etc/passwd", &[]).unwrap_err(),
            "URL scheme must be 'http' or 'https'"
        );
        assert!(validate_url("not a url", &[]).is_err());
        let allow = vec!["docs.rs".to_string()];
        assert!(validate_url("https://DOCS.rs/tokio", &allow).is_ok());
        assert_eq!(
            validate_url("https://evil.com", &allow).unwrap_err(),
            "Domain not in allowlist: evil.com"
        );
    }

    #[tokio::test]
    async fn test_navigate_reports_status_and_records() {
        let fx = Fixture::new();
        fx.mock.set_status("https://example.com/missing", 404);
        let tool = NavigateTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"url": "https://example.com/missing"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            "Navigating to https://example.com/missing returned status code 404"
        );
        assert_eq!(
            fx.recorded().await,
            vec!["    await page.goto('https://example.com/missing');"]
        );
    }

    #[tokio::test]
    async fn test_navigate_echoes_given_url() {
        let fx = Fixture::new();
        let tool = NavigateTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"url": " https://example.com "}))
            .await
            .unwrap();
        assert_eq!(out, "Navigating to https://example.com returned status code 200");
        assert_eq!(
            fx.recorded().await,
            vec!["    await page.goto('https://example.com/');"]
        );
    }

    #[tokio::test]
    async fn test_navigate_failure_is_reported() {
        let fx = Fixture::new();
        fx.mock.fail_goto("net::ERR_NAME_NOT_RESOLVED");
        let tool = NavigateTool::new(fx.ctx.clone());
        let out = tool
            .execute(json!({"url": "https://nowhere.invalid"}))
            .await
            .unwrap();
        assert_eq!(
            out,
            "Unable to navigate to https://nowhere.invalid with exception: navigation failed: net::ERR_NAME_NOT_RESOLVED"
        );
        assert_eq!(fx.mock.calls(), vec!["goto https://nowhere.invalid/"]);
    }

    #[tokio::test]
    async fn test_back_and_current_page() {
        let fx = Fixture::new();
        let nav = NavigateTool::new(fx.ctx.clone());
        let back = NavigateBackTool::new(fx.ctx.clone());
        let current = CurrentWebPageTool::new(fx.ctx.clone());

        assert_eq!(
            back.execute(json!({})).await.unwrap(),
            "Unable to navigate back; no previous page in the history"
        );
        nav.execute(json!({"url": "https://example.com/a"})).await.unwrap();
        nav.execute(json!({"url": "https://example.com/b"})).await.unwrap();
        assert_eq!(current.execute(Value::Null).await.unwrap(), "https://example.com/b");
        assert_eq!(
            back.execute(json!({})).await.unwrap(),
            "Navigated back to the previous page with URL 'https://example.com/a'. Status code 200"
        );
        assert_eq!(current.execute(json!({})).await.unwrap(), "https://example.com/a");
        assert_eq!(fx.recorded().await.last().unwrap(), "    await page.goBack();");
        assert_eq!(
            back.execute(json!({})).await.unwrap(),
            "Unable to navigate back; no previous page in the history"
        );
    }
}
