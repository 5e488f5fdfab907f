//! Consultant configuration loaded from environment (after `.env`).
//!
//! | Env | Default | Description |
//! |-----|---------|-------------|
//! | OPENAI_API_KEY | required | Model credential. |
//! | OPENAI_MODEL | gpt-4o-mini | Chat model. |
//! | OPENAI_TEMPERATURE | 0.7 | Sampling temperature. |
//! | OPENAI_BASE_URL | https://api.openai.com/v1 | OpenAI-compatible API base. |
//! | BORINGAI_LLM_TIMEOUT_SECS | 30 | Bounded wait for each model call. |
//! | HOST | 0.0.0.0 | Gateway bind address. |
//! | PORT | 8000 | Gateway listen port. |
//!
//! Unset or unparsable optional values fall back to their defaults.

use std::time::Duration;

const ENV_API_KEY: &str = "OPENAI_API_KEY";
const ENV_MODEL: &str = "OPENAI_MODEL";
const ENV_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
const ENV_BASE_URL: &str = "OPENAI_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "BORINGAI_LLM_TIMEOUT_SECS";
const ENV_HOST: &str = "HOST";
const ENV_PORT: &str = "PORT";

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set; the consultant cannot reach the model without it")]
    MissingApiKey(&'static str),
}

#[derive(Clone)]
pub struct ConsultantConfig {
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub llm_timeout: Duration,
    pub host: String,
    pub port: u16,
}

impl std::fmt::Debug for ConsultantConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsultantConfig")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("llm_timeout", &self.llm_timeout)
            .field("host", &self.host)
            .field("port", &self.port)
            .finish()
    }
}

impl ConsultantConfig {
    /// Defaults for everything except the credential.
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            base_url: DEFAULT_BASE_URL.to_string(),
            llm_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any name -> value source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .ok_or(ConfigError::MissingApiKey(ENV_API_KEY))?;

        let mut config = Self::with_api_key(api_key);
        if let Some(model) = non_empty(lookup(ENV_MODEL)) {
            config.model = model;
        }
        if let Some(base_url) = non_empty(lookup(ENV_BASE_URL)) {
            config.base_url = base_url;
        }
        if let Some(host) = non_empty(lookup(ENV_HOST)) {
            config.host = host;
        }
        config.temperature = parsed(lookup(ENV_TEMPERATURE)).unwrap_or(DEFAULT_TEMPERATURE);
        config.port = parsed(lookup(ENV_PORT)).unwrap_or(DEFAULT_PORT);
        config.llm_timeout = parsed::<u64>(lookup(ENV_TIMEOUT_SECS))
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        Ok(config)
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(value: Option<String>) -> Option<T> {
    non_empty(value).and_then(|v| v.parse().ok())
}
