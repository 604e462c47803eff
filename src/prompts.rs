//! Prompt 加载器
//!
//! 从 {config_dir}/prompts/ 目录读取 *.md / *.txt，文件名（去扩展名）为 key。
//! 目录缺失或单个文件读取失败均不致命，对应条目缺省即可。

use std::collections::HashMap;
use std::path::Path;

/// Prompt 查找表：key -> 文本内容
#[derive(Debug, Clone, Default)]
pub struct PromptStore {
    prompts: HashMap<String, String>,
}

impl PromptStore {
    /// 空表（目录缺失或测试用）
    pub fn empty() -> Self {
        Self::default()
    }

    /// 从 {config_dir}/prompts/ 加载所有 *.md / *.txt
    pub fn load(config_dir: impl AsRef<Path>) -> Self {
        let dir = config_dir.as_ref().join("prompts");
        let mut prompts = HashMap::new();

        let entries = match std::fs::read_dir(&dir) {
            Ok(rd) => rd,
            Err(_) => return Self { prompts },
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let ext_ok = path
                .extension()
                .and_then(|e| e.to_str())
                .map(|e| e == "md" || e == "txt")
                .unwrap_or(false);
            if !ext_ok {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) => s.to_string(),
                None => continue,
            };
            if let Ok(content) = std::fs::read_to_string(&path) {
                prompts.insert(stem, content);
            }
        }

        tracing::debug!("Loaded {} prompts from {}", prompts.len(), dir.display());
        Self { prompts }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.prompts.get(key).map(|s| s.as_str())
    }

    /// 取 key 对应的 prompt，缺失时返回 default
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
