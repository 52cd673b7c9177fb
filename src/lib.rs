//! Bee Browser - 供 LLM Agent 调用的浏览器自动化工具箱
//!
//! 模块划分：
//! - **browser**: 页面边界（PageDriver）、等待与断言、定位器、Chrome / Mock 实现
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 执行层错误类型
//! - **observability**: 日志初始化
//! - **recorder**: 把成功的动作录制为 Playwright 测试脚本
//! - **tools**: 17 个浏览器工具、注册表与执行器

pub mod browser;
pub mod config;
pub mod core;
pub mod observability;
pub mod recorder;
pub mod tools;

pub use browser::{BrowserError, Locator, MockPage, Page, PageDriver};
pub use config::{load_config, AppConfig};
pub use recorder::{ScriptDialect, ScriptRecorder};
pub use tools::{BrowserContext, BrowserToolkit, Tool, ToolExecutor, ToolRegistry, ToolSettings};
