//! 桥接集成测试
//!
//! 走 create_agent 工厂与公开 API：后端选择、prompt 解析、invoke/stream 契约。

use std::sync::Arc;

use futures_util::StreamExt;

use drone::bridge::{create_agent, AgentBridge, Backend, BackendKind, DEFAULT_SYSTEM_PROMPT};
use drone::engine::{DeepEngine, EngineError, EngineReply, HandoffContext};
use drone::llm::{RecordingLlmClient, Role};

/// 固定回复的引擎
struct StaticEngine {
    reply: String,
}

#[async_trait::async_trait]
impl DeepEngine for StaticEngine {
    async fn run(
        &self,
        _message: &str,
        _session_id: Option<&str>,
        _handoff: Option<&HandoffContext>,
    ) -> Result<EngineReply, EngineError> {
        Ok(EngineReply::Text(self.reply.clone()))
    }
}

#[tokio::test]
async fn test_create_agent_without_engine_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
    std::fs::write(dir.path().join("prompts/system.md"), "You are Drone.").unwrap();

    let bridge = create_agent(dir.path(), Some("deepseek-chat"));
    assert_eq!(bridge.backend_kind(), BackendKind::Fallback);
    assert_eq!(bridge.system_prompt(), "You are Drone.");
    assert_eq!(bridge.model(), "deepseek-chat");
}

#[tokio::test]
async fn test_create_agent_with_engine_config_selects_rich() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("default.toml"),
        "[engine]\nendpoint = \"http://localhost:10030\"\nmodel = \"deepseek-reasoner\"\n",
    )
    .unwrap();

    let bridge = create_agent(dir.path(), None);
    assert_eq!(bridge.backend_kind(), BackendKind::Rich);
    assert_eq!(bridge.model(), "deepseek-reasoner");
    // prompts 目录缺失时 system prompt 取默认值
    assert_eq!(bridge.system_prompt(), DEFAULT_SYSTEM_PROMPT);
}

#[tokio::test]
async fn test_invoke_and_stream_agree_end_to_end() {
    let bridge = AgentBridge::with_backend(
        Backend::Rich(Arc::new(StaticEngine {
            reply: "all good".to_string(),
        })),
        DEFAULT_SYSTEM_PROMPT,
        "deepseek-reasoner",
    );

    let reply = bridge.invoke("status?", Some("sess-1"), None).await.unwrap();
    assert_eq!(reply, "all good");

    let chunks: Vec<String> = bridge
        .stream("status?", Some("sess-1"), None)
        .await
        .unwrap()
        .collect()
        .await;
    assert_eq!(chunks, vec![reply]);
}

#[tokio::test]
async fn test_fallback_roundtrip_via_factory_shape() {
    // 注入记录型客户端，验证两条消息的构造与回复透传
    let client = Arc::new(RecordingLlmClient::new("It is 4."));
    let bridge = AgentBridge::with_backend(
        Backend::Fallback(client.clone()),
        "You are Drone.",
        "deepseek-reasoner",
    );

    let reply = bridge.invoke("What is 2 + 2?", None, None).await.unwrap();
    assert_eq!(reply, "It is 4.");

    let calls = client.calls();
    assert_eq!(calls.len(), 1);
    let roles: Vec<Role> = calls[0].iter().map(|m| m.role.clone()).collect();
    assert_eq!(roles, vec![Role::System, Role::User]);
}
