use anyhow::{Context, Result, bail};
use chef::GenerationOptions;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub llm: LlmConfig,
    pub retry: RetryConfig,
    pub cache: CacheConfig,
    pub history: HistoryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Ollama, // HTTP model server
    Fake,   // Canned replies, no network
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub base_url: String,
    pub model: String,
    pub json_mode: bool,
    pub timeout_secs: u64,
    pub repair_attempts: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repeat_penalty: f32,
    pub max_tokens: u32,
    pub num_ctx: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_retries: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub enabled: bool,
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    pub max_entries: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 7860,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        let defaults = GenerationOptions::default();
        Self {
            provider: LlmProvider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            model: "qwen2.5:7b-instruct".to_string(),
            json_mode: false,
            timeout_secs: 120,
            repair_attempts: 1,
            temperature: defaults.temperature,
            top_p: defaults.top_p,
            repeat_penalty: defaults.repeat_penalty,
            max_tokens: defaults.num_predict,
            num_ctx: defaults.num_ctx,
        }
    }
}

impl LlmConfig {
    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            repeat_penalty: self.repeat_penalty,
            num_predict: self.max_tokens,
            num_ctx: self.num_ctx,
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 1000,
            max_backoff_ms: 10000,
        }
    }
}

impl Default for CacheConfig {
    // Generations are sampled, so identical requests are not cached unless asked
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 1000,
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self { max_entries: 500 }
    }
}

impl FromStr for LlmProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "ollama" => Ok(LlmProvider::Ollama),
            "fake" => Ok(LlmProvider::Fake),
            other => bail!("unknown LLM provider: {}", other),
        }
    }
}

impl AppConfig {
    /// Load from process environment, falling back to defaults
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(host) = lookup("PANTRY_HOST") {
            config.server.host = host;
        }
        set_parsed(&lookup, "PANTRY_PORT", &mut config.server.port)?;

        set_parsed(&lookup, "LLM_PROVIDER", &mut config.llm.provider)?;
        if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
            config.llm.base_url = base_url;
        }
        if let Some(model) = lookup("HF_MODEL_NAME") {
            config.llm.model = model;
        }
        set_flag(&lookup, "LLM_JSON_MODE", &mut config.llm.json_mode)?;
        set_parsed(&lookup, "LLM_TIMEOUT_SECS", &mut config.llm.timeout_secs)?;
        set_parsed(&lookup, "LLM_REPAIR_ATTEMPTS", &mut config.llm.repair_attempts)?;
        set_parsed(&lookup, "LLM_TEMPERATURE", &mut config.llm.temperature)?;
        set_parsed(&lookup, "LLM_TOP_P", &mut config.llm.top_p)?;
        set_parsed(&lookup, "LLM_REPEAT_PENALTY", &mut config.llm.repeat_penalty)?;
        set_parsed(&lookup, "LLM_MAX_TOKENS", &mut config.llm.max_tokens)?;
        set_parsed(&lookup, "LLM_NUM_CTX", &mut config.llm.num_ctx)?;

        set_parsed(&lookup, "RETRY_MAX", &mut config.retry.max_retries)?;
        set_parsed(&lookup, "RETRY_INITIAL_BACKOFF_MS", &mut config.retry.initial_backoff_ms)?;
        set_parsed(&lookup, "RETRY_MAX_BACKOFF_MS", &mut config.retry.max_backoff_ms)?;

        set_flag(&lookup, "CACHE_ENABLED", &mut config.cache.enabled)?;
        set_parsed(&lookup, "CACHE_MAX_ENTRIES", &mut config.cache.max_entries)?;

        set_parsed(&lookup, "HISTORY_MAX_ENTRIES", &mut config.history.max_entries)?;

        if let Some(format) = lookup("LOG_FORMAT") {
            config.logging.json = format.trim().eq_ignore_ascii_case("json");
        }

        Ok(config)
    }
}

fn set_parsed<F, T>(lookup: &F, key: &str, target: &mut T) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(raw) = lookup(key) {
        *target = raw
            .trim()
            .parse()
            .map_err(|e: T::Err| anyhow::anyhow!("{}", e))
            .with_context(|| format!("invalid value for {}: {:?}", key, raw))?;
    }
    Ok(())
}

fn set_flag<F>(lookup: &F, key: &str, target: &mut bool) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(key) {
        *target = match raw.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => true,
            "0" | "false" | "no" | "off" => false,
            _ => bail!("invalid value for {}: {:?}", key, raw),
        };
    }
    Ok(())
}
