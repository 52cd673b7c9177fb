//! 核心类型：工具调用错误

pub mod error;

pub use error::AgentError;
