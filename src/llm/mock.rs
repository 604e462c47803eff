//! Mock LLM 客户端（用于测试与无 Key 运行）
//!
//! MockLlmClient 回显最后一条 User 消息；RecordingLlmClient 记录每次收到的
//! 消息并返回预设回复，供桥接测试断言消息构造与回复透传。

use std::pin::Pin;
use std::sync::Mutex;

use async_trait::async_trait;
use futures_util::stream;

use crate::llm::{LlmClient, LlmError, Message, Role};

/// Mock 客户端：回显用户最后一条消息
#[derive(Debug, Default)]
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| matches!(m.role, Role::User))
            .map(|m| m.content.as_str())
            .unwrap_or("(no input)");

        Ok(format!("Echo from Mock: {}", last_user))
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<Pin<Box<dyn futures_util::Stream<Item = Result<String, LlmError>> + Send>>, LlmError> {
        let content = self.complete(messages).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }
}

/// 记录型客户端：保存每次 complete 收到的完整消息列表，返回固定回复
#[derive(Debug)]
pub struct RecordingLlmClient {
    reply: String,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl RecordingLlmClient {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// 已记录的调用（每项为一次 complete 的消息列表）
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for RecordingLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        Ok(self.reply.clone())
    }

    async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<Pin<Box<dyn futures_util::Stream<Item = Result<String, LlmError>> + Send>>, LlmError> {
        let content = self.complete(messages).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_echoes_last_user() {
        let client = MockLlmClient;
        let reply = client
            .complete(&[Message::system("sys"), Message::user("hello")])
            .await
            .unwrap();
        assert_eq!(reply, "Echo from Mock: hello");
    }

    #[tokio::test]
    async fn test_recording_captures_messages() {
        let client = RecordingLlmClient::new("42");
        let reply = client.complete(&[Message::user("q")]).await.unwrap();
        assert_eq!(reply, "42");

        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].len(), 1);
        assert_eq!(calls[0][0].content, "q");
    }
}
