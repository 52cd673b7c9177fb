//! 浏览器层：工具所消费的页面边界
//!
//! - **driver**: PageDriver trait（导航、解析定位器、点击第 n 个匹配、截图等原语）
//! - **page**: Page 包装，实现等待、严格模式、截图落盘
//! - **expect**: 轮询断言（文本、标题、可见 / 隐藏）
//! - **locator**: 定位器与 Playwright 表达式渲染
//! - **chrome**: Headless Chrome 实现（feature "browser"）
//! - **mock**: 脚本化实现，供测试使用

pub mod driver;
pub mod error;
pub mod expect;
pub mod locator;
pub mod mock;
pub mod page;

#[cfg(feature = "browser")]
pub mod chrome;

pub use driver::{ElementState, HistoryEntry, PageDriver};
pub use error::BrowserError;
pub use expect::{Expect, TextMatch, DEFAULT_EXPECT_TIMEOUT};
pub use locator::{js_string, Locator, Selector};
pub use mock::MockPage;
pub use page::{ActionOptions, Page};

#[cfg(feature = "browser")]
pub use chrome::ChromeDriver;
