// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::ingest::providers::youtube::DEFAULT_API_BASE;
use crate::ingest::PollerCfg;
use crate::retrieval::{IndexBackend, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K};
use crate::store::CHAT_COLLECTION;

pub const ENV_CONFIG_PATH: &str = "LIVE_CHAT_CONFIG_PATH";
pub const DEFAULT_TOML_PATH: &str = "config/live_chat.toml";
pub const DEFAULT_JSON_PATH: &str = "config/live_chat.json";

const ENV_API_KEY: &str = "YOUTUBE_API_KEY";
const ENV_ACCESS_TOKEN: &str = "YOUTUBE_ACCESS_TOKEN";

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub polling: PollingConfig,
    pub store: StoreConfig,
    pub retrieval: RetrievalConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub api_base: String,
    /// "ENV" means: read from YOUTUBE_API_KEY.
    pub api_key: Option<String>,
    /// "ENV" means: read from YOUTUBE_ACCESS_TOKEN.
    pub access_token: Option<String>,
    pub request_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_key: Some("ENV".to_string()),
            access_token: None,
            request_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PollingConfig {
    pub page_size_hint: u32,
    pub min_delay_ms: u64,
    pub default_delay_ms: u64,
    /// 0 = poll until cancelled or the stream ends.
    pub max_iterations: u64,
    pub history_capacity: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            page_size_hint: 200,
            min_delay_ms: 100,
            default_delay_ms: 2000,
            max_iterations: 0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub enabled: bool,
    pub url: Option<String>,
    pub collection: String,
    pub timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: None,
            collection: CHAT_COLLECTION.to_string(),
            timeout_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetrievalConfig {
    pub backend: IndexBackend,
    pub chunk_size: usize,
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::Lexical,
            chunk_size: DEFAULT_CHUNK_SIZE,
            top_k: DEFAULT_TOP_K,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// e.g. "127.0.0.1:9898"; serves /metrics and /health when set.
    pub metrics_addr: Option<String>,
    pub log_format: LogFormat,
}

impl AppConfig {
    /// Load from an explicit path (TOML or JSON by extension), then sanitize.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        let ext = path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let cfg: AppConfig = if ext == "json" {
            serde_json::from_str(&content).context("parsing json config")?
        } else {
            toml::from_str(&content).context("parsing toml config")?
        };
        Ok(cfg.sanitized())
    }

    /// Load using env var + fallbacks:
    /// 1) $LIVE_CHAT_CONFIG_PATH
    /// 2) config/live_chat.toml
    /// 3) config/live_chat.json
    /// 4) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if pb.exists() {
                return Self::load_from_file(&pb);
            }
            return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
        }
        for candidate in [DEFAULT_TOML_PATH, DEFAULT_JSON_PATH] {
            let p = PathBuf::from(candidate);
            if p.exists() {
                return Self::load_from_file(&p);
            }
        }
        Ok(Self::default())
    }

    /// Reset zero values that would break the engine or the chunker.
    pub fn sanitized(mut self) -> Self {
        let d_poll = PollingConfig::default();
        if self.polling.page_size_hint == 0 {
            self.polling.page_size_hint = d_poll.page_size_hint;
        }
        if self.polling.history_capacity == 0 {
            self.polling.history_capacity = d_poll.history_capacity;
        }
        if self.polling.min_delay_ms == 0 {
            self.polling.min_delay_ms = d_poll.min_delay_ms;
        }
        let d_ret = RetrievalConfig::default();
        if self.retrieval.chunk_size == 0 {
            self.retrieval.chunk_size = d_ret.chunk_size;
        }
        if self.retrieval.top_k == 0 {
            self.retrieval.top_k = d_ret.top_k;
        }
        if self.store.collection.trim().is_empty() {
            self.store.collection = CHAT_COLLECTION.to_string();
        }
        self
    }

    pub fn poller_cfg(&self) -> PollerCfg {
        PollerCfg {
            page_size_hint: self.polling.page_size_hint,
            min_delay: Duration::from_millis(self.polling.min_delay_ms),
            default_delay: Duration::from_millis(self.polling.default_delay_ms),
            max_iterations: self.polling.max_iterations,
            history_capacity: self.polling.history_capacity,
            store_timeout: Duration::from_millis(self.store.timeout_ms),
        }
    }
}

impl SourceConfig {
    /// API key with "ENV" resolved. A missing env var yields `None`.
    pub fn resolved_api_key(&self) -> Option<String> {
        resolve_env(self.api_key.as_deref(), ENV_API_KEY)
    }

    pub fn resolved_access_token(&self) -> Option<String> {
        resolve_env(self.access_token.as_deref(), ENV_ACCESS_TOKEN)
    }
}

fn resolve_env(value: Option<&str>, var: &str) -> Option<String> {
    let v = value?.trim();
    if v.eq_ignore_ascii_case("env") {
        env::var(var).ok().filter(|s| !s.trim().is_empty())
    } else if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}
