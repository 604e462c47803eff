//! 远程深度引擎客户端
//!
//! 通过 HTTP 调用部署在别处的深度引擎（POST {endpoint}/v1/agent/run）。
//! connect 在端点缺失时返回 Unavailable、非法时返回 InvalidEndpoint，
//! 由桥接据此降级。

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use super::traits::{DeepEngine, EngineError, EngineReply, HandoffContext};
use crate::config::EngineSection;

/// 远程引擎：持有端点、模型与 system prompt，run 时组包发送
pub struct RemoteEngine {
    endpoint: String,
    model: String,
    system_prompt: String,
    http: Client,
}

impl RemoteEngine {
    /// 构造客户端。端点未配置返回 Unavailable；URL 非法返回 InvalidEndpoint。
    pub fn connect(
        cfg: &EngineSection,
        model: &str,
        system_prompt: &str,
    ) -> Result<Self, EngineError> {
        let endpoint = match &cfg.endpoint {
            Some(e) if !e.trim().is_empty() => e.trim().trim_end_matches('/').to_string(),
            _ => return Err(EngineError::Unavailable),
        };
        reqwest::Url::parse(&endpoint)
            .map_err(|e| EngineError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()
            .map_err(|e| EngineError::Request(e.to_string()))?;

        Ok(Self {
            endpoint,
            model: model.to_string(),
            system_prompt: system_prompt.to_string(),
            http,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl DeepEngine for RemoteEngine {
    async fn run(
        &self,
        message: &str,
        session_id: Option<&str>,
        handoff: Option<&HandoffContext>,
    ) -> Result<EngineReply, EngineError> {
        let mut body = serde_json::json!({
            "model": self.model,
            "system_prompt": self.system_prompt,
            "message": message,
        });
        if let Some(sid) = session_id {
            body["session_id"] = serde_json::json!(sid);
        }
        if let Some(h) = handoff {
            body["handoff"] = h.0.clone();
        }

        let url = format!("{}/v1/agent/run", self.endpoint);
        let resp = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Request(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::Api(status.as_u16(), text));
        }

        let data: Value = resp
            .json()
            .await
            .map_err(|e| EngineError::InvalidReply(e.to_string()))?;

        Ok(EngineReply::from_value(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connect_without_endpoint_is_unavailable() {
        let cfg = EngineSection::default();
        match RemoteEngine::connect(&cfg, "deepseek-reasoner", "sys") {
            Err(EngineError::Unavailable) => {}
            other => panic!("expected Unavailable, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_connect_with_blank_endpoint_is_unavailable() {
        let cfg = EngineSection {
            endpoint: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RemoteEngine::connect(&cfg, "m", "s"),
            Err(EngineError::Unavailable)
        ));
    }

    #[test]
    fn test_connect_with_invalid_url() {
        let cfg = EngineSection {
            endpoint: Some("not a url".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            RemoteEngine::connect(&cfg, "m", "s"),
            Err(EngineError::InvalidEndpoint(_))
        ));
    }

    #[test]
    fn test_connect_strips_trailing_slash() {
        let cfg = EngineSection {
            endpoint: Some("http://localhost:10030/".to_string()),
            ..Default::default()
        };
        let engine = RemoteEngine::connect(&cfg, "m", "s").unwrap();
        assert_eq!(engine.endpoint(), "http://localhost:10030");
    }
}
