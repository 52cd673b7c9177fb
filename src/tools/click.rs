//! 点击工具：click_element（选择器）与 click_by_text（角色 + 文本，带降级链）
//!
//! click_by_text 的降级顺序：
//! 1. `getByRole(selector).getByText(text)` 可见则点击它
//! 2. 否则点击 `getByText(text)`
//! 3. 以上任一步出错，改用非严格的 `locator(selector, { hasText: text })` 点击第一个匹配；
//!    这一步超时才返回失败字符串

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::Value;

use crate::browser::{ActionOptions, BrowserError, Locator};
use crate::tools::context::{parse_args, require_non_empty};
use crate::tools::schema::input_schema;
use crate::tools::{BrowserContext, Tool};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClickInput {
    /// CSS selector for the element to click
    pub selector: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ClickByTextInput {
    /// Role or CSS selector of the element to click, e.g. "button" or "link"
    pub selector: String,
    /// Text content of the element to click on
    pub text: String,
}

/// 按定位器点击；超时与其他浏览器错误都转为失败字符串。frame 只影响提示文本
pub(crate) async fn click_locator(
    ctx: &BrowserContext,
    locator: &Locator,
    selector: &str,
    frame: Option<&str>,
) -> String {
    let within = frame
        .map(|f| format!(" inside iframe '{f}'"))
        .unwrap_or_default();
    match ctx.page.click(locator, ctx.settings.action_options()).await {
        Ok(()) => {
            ctx.recorder
                .record(&format!("{}.click()", locator.to_playwright()))
                .await;
            format!("Clicked element '{selector}'{within}")
        }
        Err(e) if e.is_timeout() => format!("Unable to click on element '{selector}'{within}"),
        Err(e) => format!("Unable to click on element '{selector}'{within} with exception: {e}"),
    }
}

/// click_by_text 降级链；frame 为 Some 时所有定位器限定在该 iframe 内
pub(crate) async fn click_by_text(
    ctx: &BrowserContext,
    frame: Option<&str>,
    selector: &str,
    text: &str,
) -> Result<String, String> {
    let scoped = |locator: Locator| match frame {
        Some(f) => locator.in_frame(f),
        None => locator,
    };
    let within = frame
        .map(|f| format!(" inside iframe '{f}'"))
        .unwrap_or_default();
    let success =
        format!("Click on the element with selector: '{selector}' text: '{text}'{within}, was successfully performed");
    let strict = ActionOptions::new(ctx.settings.action_timeout, true);

    let by_role = scoped(Locator::role(selector).get_by_text(text));
    let attempt = async {
        if ctx.page.is_visible(&by_role).await? {
            ctx.page.click(&by_role, strict).await?;
            Ok::<Locator, BrowserError>(by_role.clone())
        } else {
            let by_text = scoped(Locator::text(text));
            ctx.page.click(&by_text, strict).await?;
            Ok(by_text)
        }
    }
    .await;

    let first_error = match attempt {
        Ok(clicked) => {
            ctx.recorder
                .record(&format!("{}.click()", clicked.to_playwright()))
                .await;
            return Ok(success);
        }
        Err(e) => e,
    };
    tracing::debug!(error = %first_error, selector = %selector, text = %text, "click by text falling back to has-text");

    let fallback = scoped(Locator::has_text(selector, text)).first();
    let relaxed = ActionOptions::new(ctx.settings.action_timeout, false);
    match ctx.page.click(&fallback, relaxed).await {
        Ok(()) => {
            ctx.recorder
                .record(&format!("{}.click()", fallback.to_playwright()))
                .await;
            Ok(success)
        }
        Err(e) if e.is_timeout() => Ok(format!(
            "Unable to click on element with selector: '{selector}' text:'{text}'{within} with exception: {e}"
        )),
        Err(e) => Err(format!(
            "Click by text failed for selector '{selector}' text '{text}': {e}"
        )),
    }
}

/// 按 CSS 选择器点击元素
pub struct ClickTool {
    ctx: BrowserContext,
}

impl ClickTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ClickTool {
    fn name(&self) -> &str {
        "click_element"
    }

    fn description(&self) -> &str {
        "Click on an element with the given CSS selector"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ClickInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ClickInput = parse_args(self.name(), args)?;
        require_non_empty("selector", &input.selector)?;
        tracing::info!(selector = %input.selector, "click tool execute");
        let locator = Locator::parse(&input.selector).visible(self.ctx.settings.visible_only);
        Ok(click_locator(&self.ctx, &locator, &input.selector, None).await)
    }
}

/// 按角色与文本点击元素
pub struct ClickByTextTool {
    ctx: BrowserContext,
}

impl ClickByTextTool {
    pub fn new(ctx: BrowserContext) -> Self {
        Self { ctx }
    }
}

#[async_trait]
impl Tool for ClickByTextTool {
    fn name(&self) -> &str {
        "click_by_text"
    }

    fn description(&self) -> &str {
        "Click on element in the current web page matching the text content"
    }

    fn parameters_schema(&self) -> Value {
        input_schema::<ClickByTextInput>()
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let input: ClickByTextInput = parse_args(self.name(), args)?;
        require_non_empty("selector", &input.selector)?;
        require_non_empty("text", &input.text)?;
        tracing::info!(selector = %input.selector, text = %input.text, "click_by_text tool execute");
        click_by_text(&self.ctx, None, &input.selector, &input.text).await
    }
}
