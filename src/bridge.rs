//! 调用桥接核心
//!
//! 构造期在深度引擎（Rich）与直连 LLM（Fallback）之间二选一，之后所有调用
//! 固定走选定后端：invoke 返回完整回复，stream 为单块占位流。Rich 路径的
//! 单次调用失败转为错误文本回复而非异常，会话期内后端身份不变；Fallback
//! 路径的 LLM 错误按原样向上传播。

use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{stream, Stream};

use crate::config::{load_config, AppConfig};
use crate::engine::{DeepEngine, HandoffContext, RemoteEngine};
use crate::error::AgentError;
use crate::llm::{
    create_deepseek_client, model_for_tier, LlmClient, Message, MockLlmClient, ModelTier,
    OpenAiClient, DEEPSEEK_REASONER,
};
use crate::prompts::PromptStore;

/// prompts 目录无 system 条目时的默认 system prompt
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";

/// 构造期选定的后端
pub enum Backend {
    /// 深度引擎
    Rich(Arc<dyn DeepEngine>),
    /// 直连 LLM
    Fallback(Arc<dyn LlmClient>),
}

/// 后端标签（只读观察用）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Rich,
    Fallback,
}

/// Agent 调用桥接：构造后不可变，可在并发调用间共享
pub struct AgentBridge {
    backend: Backend,
    system_prompt: String,
    model: String,
}

/// 解析引擎模型名：构造参数 > 配置（含 DRONE__ENGINE__MODEL 环境覆盖）> 默认
pub fn resolve_model(explicit: Option<&str>, configured: Option<&str>) -> String {
    explicit
        .map(String::from)
        .or_else(|| configured.map(String::from))
        .unwrap_or_else(|| DEEPSEEK_REASONER.to_string())
}

/// 创建 Fallback 直连客户端：有 DeepSeek/OpenAI Key 时按档位选模型，否则 Mock + 警告
pub(crate) fn create_fallback_llm(cfg: &AppConfig, tier: ModelTier) -> Arc<dyn LlmClient> {
    let provider = cfg.llm.provider.to_lowercase();
    // 有 DeepSeek Key 或（配置为 deepseek 且仅有 OpenAI Key 时也走 DeepSeek 兼容端点）
    let use_deepseek = std::env::var("DEEPSEEK_API_KEY").is_ok()
        || (provider == "deepseek" && std::env::var("OPENAI_API_KEY").is_ok());
    let use_openai = std::env::var("OPENAI_API_KEY").is_ok() && provider != "deepseek";

    if use_deepseek {
        let model = cfg
            .llm
            .deepseek
            .model
            .clone()
            .unwrap_or_else(|| model_for_tier(tier).to_string());
        tracing::info!("Using DeepSeek fallback LLM ({})", model);
        Arc::new(create_deepseek_client(Some(&model)))
    } else if use_openai {
        let model = cfg.llm.openai.model.clone().unwrap_or_else(|| {
            match tier {
                ModelTier::Chat => "gpt-4o-mini",
                ModelTier::Reasoning => "gpt-4o",
            }
            .to_string()
        });
        let base = cfg.llm.base_url.as_deref();
        tracing::info!("Using OpenAI fallback LLM ({})", model);
        Arc::new(OpenAiClient::new(
            base,
            &model,
            std::env::var("OPENAI_API_KEY").ok().as_deref(),
        ))
    } else {
        tracing::warn!("No API key set, fallback uses Mock LLM");
        Arc::new(MockLlmClient)
    }
}

impl AgentBridge {
    /// 按配置与 prompt 表构造：尝试连接深度引擎，失败则降级为直连 LLM。
    /// 构造本身永不失败，总是得到可用实例。
    pub fn new(cfg: &AppConfig, prompts: &PromptStore, model_name: Option<&str>) -> Self {
        let system_prompt = prompts.get_or("system", DEFAULT_SYSTEM_PROMPT).to_string();
        let model = resolve_model(model_name, cfg.engine.model.as_deref());

        let backend = match RemoteEngine::connect(&cfg.engine, &model, &system_prompt) {
            Ok(engine) => {
                tracing::info!("Using deep engine at {} ({})", engine.endpoint(), model);
                Backend::Rich(Arc::new(engine))
            }
            Err(e) => {
                tracing::warn!("Deep engine unavailable ({}), falling back to direct LLM", e);
                Backend::Fallback(create_fallback_llm(cfg, ModelTier::Reasoning))
            }
        };

        Self {
            backend,
            system_prompt,
            model,
        }
    }

    /// 直接注入后端（测试或自定义装配）
    pub fn with_backend(
        backend: Backend,
        system_prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            system_prompt: system_prompt.into(),
            model: model.into(),
        }
    }

    pub fn backend_kind(&self) -> BackendKind {
        match self.backend {
            Backend::Rich(_) => BackendKind::Rich,
            Backend::Fallback(_) => BackendKind::Fallback,
        }
    }

    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }

    /// 引擎模型名（仅 Rich 后端有意义）
    pub fn model(&self) -> &str {
        &self.model
    }

    /// 处理一条用户消息，返回完整回复
    ///
    /// session_id 当前不改变行为（桥接按调用无状态），保留给未来的会话扩展；
    /// handoff 原样透传给引擎。
    pub async fn invoke(
        &self,
        message: &str,
        session_id: Option<&str>,
        handoff: Option<&HandoffContext>,
    ) -> Result<String, AgentError> {
        if message.trim().is_empty() {
            return Err(AgentError::EmptyMessage);
        }

        match &self.backend {
            Backend::Rich(engine) => {
                match engine.run(message, session_id, handoff).await {
                    Ok(reply) => Ok(reply.into_text()),
                    // 单次失败以错误文本回复，后端身份在会话期内不变
                    Err(e) => {
                        tracing::warn!("Engine run failed: {}", e);
                        Ok(format!("Error running agent: {}", e))
                    }
                }
            }
            Backend::Fallback(llm) => {
                let messages = vec![
                    Message::system(self.system_prompt.as_str()),
                    Message::user(message),
                ];
                let reply = llm.complete(&messages).await?;
                Ok(reply)
            }
        }
    }

    /// 流式回复（占位实现）：先取完整回复，再作为单块流返回
    pub async fn stream(
        &self,
        message: &str,
        session_id: Option<&str>,
        handoff: Option<&HandoffContext>,
    ) -> Result<Pin<Box<dyn Stream<Item = String> + Send>>, AgentError> {
        let reply = self.invoke(message, session_id, handoff).await?;
        Ok(Box::pin(stream::iter(vec![reply])))
    }
}

/// 创建桥接实例：加载 {config_dir}/default.toml 与 prompts/，选定后端
///
/// 协议层（CLI / drone-web）唯一的装配入口。
pub fn create_agent(config_dir: impl AsRef<Path>, model_name: Option<&str>) -> AgentBridge {
    let dir = config_dir.as_ref();
    let cfg = load_config(Some(dir)).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        AppConfig::default()
    });
    let prompts = PromptStore::load(dir);
    AgentBridge::new(&cfg, &prompts, model_name)
}
