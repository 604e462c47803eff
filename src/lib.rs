//! Drone - Rust Agent 调用桥接
//!
//! 模块划分：
//! - **bridge**: 调用桥接核心（构造期后端二选一、invoke / stream 统一契约）
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **engine**: 深度引擎客户端（Rich 后端，远程 HTTP 调用）
//! - **error**: 调用错误类型
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / Mock）
//! - **observability**: 日志初始化
//! - **prompts**: Prompt 目录加载（key -> 文本）

pub mod bridge;
pub mod config;
pub mod engine;
pub mod error;
pub mod llm;
pub mod observability;
pub mod prompts;

pub use bridge::{create_agent, AgentBridge, Backend, BackendKind};
