//! Engine configuration.
//!
//! Every section has defaults, so an empty TOML file (or no file at all)
//! yields a working configuration. Credentials and endpoints can be
//! overridden from the environment.
//!
//! ```toml
//! [llm]
//! model = "gpt-4.1-mini"
//! conversation_timeout_secs = 45
//!
//! [cache]
//! capacity = 500
//! ```

use crate::error::{EngineError, Result};
use llm_client::{OpenAiSettings, DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_BASE_URL: &str = "CASK_LLM_BASE_URL";
pub const ENV_MODEL: &str = "CASK_LLM_MODEL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub limits: LimitsConfig,
    pub sampler: SamplerConfig,
    pub cache: CacheConfig,
    pub llm: LlmConfig,
    pub agentic: AgenticConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub min_limit: usize,
    pub max_limit: usize,
    pub default_limit: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            min_limit: 1,
            max_limit: 20,
            default_limit: 10,
        }
    }
}

impl LimitsConfig {
    pub fn clamp(&self, limit: usize) -> usize {
        limit.clamp(self.min_limit, self.max_limit.max(self.min_limit))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    pub pool_size: usize,
    pub target: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            pool_size: sources::DEFAULT_POOL_SIZE,
            target: sources::DEFAULT_TARGET,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 200,
            ttl_secs: 300,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    /// Usually supplied through `OPENAI_API_KEY` rather than the file
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    pub conversation_timeout_secs: u64,
    pub max_concurrent_calls: usize,
    pub max_tool_calls: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            request_timeout_secs: 30,
            conversation_timeout_secs: 60,
            max_concurrent_calls: 4,
            max_tool_calls: 2,
        }
    }
}

impl LlmConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn conversation_timeout(&self) -> Duration {
        Duration::from_secs(self.conversation_timeout_secs)
    }

    pub fn to_settings(&self) -> OpenAiSettings {
        OpenAiSettings {
            base_url: self.base_url.clone(),
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            request_timeout: self.request_timeout(),
            max_concurrent_calls: self.max_concurrent_calls,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgenticConfig {
    /// Size of the catalog scan used to resolve the model's ids
    pub resolve_scan_limit: usize,
}

impl Default for AgenticConfig {
    fn default() -> Self {
        Self {
            resolve_scan_limit: 1000,
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml_str(&content)?;
        info!("Loaded engine configuration from {}", path.display());
        Ok(config)
    }

    /// Apply `OPENAI_API_KEY`, `CASK_LLM_BASE_URL` and `CASK_LLM_MODEL`
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(key) = non_empty(ENV_API_KEY) {
            self.llm.api_key = key;
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.llm.base_url = url;
        }
        if let Some(model) = non_empty(ENV_MODEL) {
            self.llm.model = model;
        }
        self
    }
}
