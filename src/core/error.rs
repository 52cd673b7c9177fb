//! 工具调用层错误类型
//!
//! 工具本身把浏览器失败转为状态字符串返回给 LLM；AgentError 只描述调用失败本身
//! （参数 / 未知工具 / 超时 / 阻塞调用），由 ToolExecutor 产生。

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Tool execution failed: {0}")]
    ToolExecutionFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    /// LLM 请求了未注册的工具
    #[error("Hallucinated tool: {0}")]
    HallucinatedTool(String),

    /// 在异步运行时内调用了阻塞路径
    #[error("Blocking tool call inside an async runtime: {0}")]
    BlockingInRuntime(String),
}

