use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::core::types::ArtifactKind;

pub const API_URL_ENV: &str = "STUDY_BUDDY_API_URL";

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,
    #[serde(default = "default_kind")]
    pub default_kind: ArtifactKind,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl AppConfig {
    /// 读取配置文件（默认 config.toml），文件不存在时使用默认配置，最后应用环境变量
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let mut cfg = Self::from_file(config_path)?;
        cfg.apply_env(|key| std::env::var(key).ok());
        Ok(cfg)
    }

    fn from_file(config_path: Option<&Path>) -> Result<Self> {
        let path = config_path.unwrap_or_else(|| Path::new("config.toml"));
        if path.exists() {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
            let cfg: AppConfig = toml::from_str(&raw)
                .with_context(|| format!("解析配置文件失败: {}", path.display()))?;
            debug!("已加载配置文件: {}", path.display());
            return Ok(cfg);
        }
        Ok(AppConfig::default())
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(API_URL_ENV).filter(|u| !u.trim().is_empty()) {
            self.api_base_url = url.trim().to_string();
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            default_kind: default_kind(),
            log_level: default_log_level(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_image_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_kind() -> ArtifactKind {
    ArtifactKind::Summarize
}

fn default_log_level() -> String {
    "info".to_string()
}
