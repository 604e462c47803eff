//! 深度引擎抽象
//!
//! DeepEngine 是 Rich 后端的统一接口：run 接收一条用户消息与可选的会话/交接
//! 上下文，返回归一化的 EngineReply。构造（connect）可失败，由桥接在构造期
//! 决定是否落入 Fallback。

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 跨 Agent 交接上下文：调用方提供的不透明值，原样透传给引擎，桥接不校验不修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffContext(pub serde_json::Value);

/// 引擎错误
#[derive(Error, Debug)]
pub enum EngineError {
    /// 引擎未配置端点，等价于集成不可用
    #[error("engine endpoint not configured")]
    Unavailable,

    #[error("invalid engine endpoint: {0}")]
    InvalidEndpoint(String),

    /// 请求发送失败（网络、超时、客户端构建）
    #[error("engine request failed: {0}")]
    Request(String),

    /// 引擎返回非 2xx
    #[error("engine error {0}: {1}")]
    Api(u16, String),

    /// 响应体不是 JSON
    #[error("invalid engine reply: {0}")]
    InvalidReply(String),
}

/// 引擎回复：显式区分文本与原始 JSON，不对响应做鸭子类型探测
#[derive(Debug, Clone, PartialEq)]
pub enum EngineReply {
    /// 文本回复
    Text(String),
    /// 未识别的结构，保留原始 JSON
    Raw(serde_json::Value),
}

impl EngineReply {
    /// 从响应 JSON 归一化：顶层字符串或 output/content 字符串字段视为文本，
    /// 其余保留原始值
    pub fn from_value(value: serde_json::Value) -> Self {
        if let Some(s) = value.as_str() {
            return EngineReply::Text(s.to_string());
        }
        for key in ["output", "content"] {
            if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                return EngineReply::Text(s.to_string());
            }
        }
        EngineReply::Raw(value)
    }

    /// 提取文本：Raw 序列化为 JSON 字符串
    pub fn into_text(self) -> String {
        match self {
            EngineReply::Text(s) => s,
            EngineReply::Raw(v) => v.to_string(),
        }
    }
}

/// 深度引擎客户端 trait
#[async_trait]
pub trait DeepEngine: Send + Sync {
    /// 执行一次 agent run，返回归一化回复
    async fn run(
        &self,
        message: &str,
        session_id: Option<&str>,
        handoff: Option<&HandoffContext>,
    ) -> Result<EngineReply, EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_reply_from_top_level_string() {
        let reply = EngineReply::from_value(json!("hello"));
        assert_eq!(reply, EngineReply::Text("hello".to_string()));
    }

    #[test]
    fn test_reply_from_output_field() {
        let reply = EngineReply::from_value(json!({"output": "done", "steps": 3}));
        assert_eq!(reply, EngineReply::Text("done".to_string()));
    }

    #[test]
    fn test_reply_from_content_field() {
        let reply = EngineReply::from_value(json!({"content": "hi"}));
        assert_eq!(reply, EngineReply::Text("hi".to_string()));
    }

    #[test]
    fn test_unrecognized_shape_kept_raw() {
        let value = json!({"steps": [1, 2, 3]});
        let reply = EngineReply::from_value(value.clone());
        assert_eq!(reply, EngineReply::Raw(value.clone()));
        assert_eq!(reply.into_text(), value.to_string());
    }
}
