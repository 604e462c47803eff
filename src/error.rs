//! 调用错误类型
//!
//! Rich 路径的引擎单次调用失败在 invoke 内转为错误文本回复，不经过这里；
//! Fallback 路径的 LLM 错误按原样向上传播。

use thiserror::Error;

use crate::llm::LlmError;

/// invoke / stream 可能返回的错误
#[derive(Error, Debug)]
pub enum AgentError {
    /// message 为空或全空白
    #[error("Empty message")]
    EmptyMessage,

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}
