use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Configuration from council.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub refresh: RefreshConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Ceiling for assessment, review run and council resubmit calls
    #[serde(default = "default_llm_timeout_ms")]
    pub llm_timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            llm_timeout_ms: default_llm_timeout_ms(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_llm_timeout_ms() -> u64 {
    600_000
}

/// Shortest refresh period accepted; anything lower is clamped
pub const MIN_REFRESH_SECS: u64 = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
}

impl RefreshConfig {
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.interval_secs.max(MIN_REFRESH_SECS))
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        RefreshConfig {
            interval_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    8
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where drafts, preferences and the log file live.
    /// If absent, the platform data directory is used.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Theme overrides keyed by slot name (e.g. `highlight = "#FB4196"`)
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: ClientConfig = toml::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.api.llm_timeout_ms, 600_000);
        assert_eq!(config.refresh.interval_secs, 8);
        assert_eq!(config.log.level, "info");
        assert!(config.storage.dir.is_none());
    }

    #[test]
    fn refresh_interval_is_clamped() {
        let config: ClientConfig = toml::from_str("[refresh]\ninterval_secs = 0\n").unwrap();
        assert_eq!(config.refresh.interval().as_secs(), MIN_REFRESH_SECS);
    }
}
