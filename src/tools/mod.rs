//! 浏览器工具
//!
//! - **registry / executor**: Tool trait、注册表与带超时的执行器
//! - **context**: 工具共享的页面、录制器与设置
//! - **click / iframe / navigate / expect / extract / fill / screenshot**: 各工具实现
//! - **toolkit**: 一次构建并注册全部工具

pub mod click;
pub mod context;
pub mod executor;
pub mod expect;
pub mod extract;
pub mod fill;
pub mod iframe;
pub mod navigate;
pub mod registry;
pub mod schema;
pub mod screenshot;
pub mod toolkit;

#[cfg(test)]
mod testing;

pub use click::{ClickByTextTool, ClickTool};
pub use context::{BrowserContext, ToolSettings};
pub use executor::ToolExecutor;
pub use expect::{ExpectTestIdTool, ExpectTextTool, ExpectTitleTool};
pub use extract::{ExtractHyperlinksTool, ExtractTextTool, GetElementsTool};
pub use fill::FillTool;
pub use iframe::{IframeClickByTextTool, IframeClickTool, IframeExpectHiddenTool, IframeUploadTool};
pub use navigate::{CurrentWebPageTool, NavigateBackTool, NavigateTool};
pub use registry::{Tool, ToolRegistry};
pub use schema::{input_schema, tool_call_schema_json};
pub use screenshot::TakeScreenshotTool;
pub use toolkit::BrowserToolkit;
