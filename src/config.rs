//! 应用配置：从 {config_dir}/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `DRONE__*` 覆盖（双下划线表示嵌套，
//! 如 `DRONE__ENGINE__MODEL=deepseek-chat`）。环境变量只在这里读取一次，
//! 桥接本身只接收解析好的值。

use std::path::Path;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub web: WebSection,
}

/// [engine] 段：深度引擎端点与模型
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// 引擎 HTTP 端点；未设置时视为引擎不可用，桥接落入 Fallback
    pub endpoint: Option<String>,
    /// 引擎模型名（可被构造参数覆盖）
    pub model: Option<String>,
    /// 单次引擎请求超时（秒）
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_request_timeout_secs() -> u64 {
    120
}

impl Default for EngineSection {
    fn default() -> Self {
        Self {
            endpoint: None,
            model: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// [llm] 段：Fallback 直连 LLM 的后端选择
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    /// 后端：deepseek / openai；优先级由 API Key 与 provider 共同决定
    #[serde(default = "default_provider")]
    pub provider: String,
    pub base_url: Option<String>,
    #[serde(default)]
    pub deepseek: LlmDeepSeekSection,
    #[serde(default)]
    pub openai: LlmOpenAiSection,
}

fn default_provider() -> String {
    "deepseek".to_string()
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            deepseek: LlmDeepSeekSection::default(),
            openai: LlmOpenAiSection::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmDeepSeekSection {
    pub model: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmOpenAiSection {
    pub model: Option<String>,
}

/// [web] 段：drone-web 监听端口
#[derive(Debug, Clone, Deserialize)]
pub struct WebSection {
    #[serde(default = "default_web_port")]
    pub port: u16,
}

fn default_web_port() -> u16 {
    8090
}

impl Default for WebSection {
    fn default() -> Self {
        Self {
            port: default_web_port(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engine: EngineSection::default(),
            llm: LlmSection::default(),
            web: WebSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 DRONE__* 可覆盖
///
/// 1. 若传入 config_dir，读取其中的 default.toml；否则按顺序查找
///    config/default.toml、../config/default.toml，找到则作为第一源
/// 2. 最后叠加环境变量 DRONE__*（双下划线表示嵌套键）
pub fn load_config(config_dir: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    match config_dir {
        Some(dir) => {
            let path = dir.join("default.toml");
            if path.exists() {
                builder = builder.add_source(config::File::from(path).required(false));
            }
        }
        None => {
            let default_names = ["config/default", "../config/default"];
            for name in default_names {
                let path = format!("{}.toml", name);
                if std::path::Path::new(&path).exists() {
                    builder = builder.add_source(config::File::with_name(name).required(false));
                    break;
                }
            }
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("DRONE")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert!(cfg.engine.endpoint.is_none());
        assert!(cfg.engine.model.is_none());
        assert_eq!(cfg.engine.request_timeout_secs, 120);
        assert_eq!(cfg.llm.provider, "deepseek");
        assert_eq!(cfg.web.port, 8090);
    }

    #[test]
    fn test_load_from_toml_then_env_override() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            "[engine]\nmodel = \"from-toml\"\n",
        )
        .unwrap();

        let cfg = load_config(Some(dir.path())).unwrap();
        assert_eq!(cfg.engine.model.as_deref(), Some("from-toml"));

        // 同一个测试内先后验证，避免并发测试间的环境变量竞争
        std::env::set_var("DRONE__ENGINE__MODEL", "from-env");
        let cfg = load_config(Some(dir.path())).unwrap();
        assert_eq!(cfg.engine.model.as_deref(), Some("from-env"));
        std::env::remove_var("DRONE__ENGINE__MODEL");
    }

    #[test]
    fn test_missing_config_dir_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = load_config(Some(dir.path())).unwrap();
        assert!(cfg.engine.endpoint.is_none());
        assert_eq!(cfg.llm.provider, "deepseek");
    }
}
