//! Engine settings loaded from the environment.
//!
//! `.env` files are loaded by `main` before this runs. Unset variables fall
//! back to defaults; unparsable numeric values fall back too, with a warning.

use std::fmt;

use pokearena_domain::BatchSize;

use crate::infrastructure::groq::{DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL, DEFAULT_TIMEOUT_SECS};

pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 3000;

#[derive(Clone)]
pub struct LlmSettings {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

impl fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmSettings")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct EngineSettings {
    pub llm: LlmSettings,
    pub server_host: String,
    pub server_port: u16,
    pub default_batch_size: BatchSize,
    /// Comma-separated origins, or `*`. CORS is off when unset.
    pub cors_allowed_origins: Option<String>,
}

impl EngineSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let llm = LlmSettings {
            base_url: get("LLM_BASE_URL").unwrap_or_else(|| DEFAULT_GROQ_BASE_URL.to_string()),
            model: get("LLM_MODEL").unwrap_or_else(|| DEFAULT_GROQ_MODEL.to_string()),
            api_key: get("GROQ_API_KEY"),
            timeout_secs: parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), DEFAULT_TIMEOUT_SECS),
        };

        let default_batch_size = match get("DEFAULT_BATCH_SIZE") {
            Some(raw) => match raw.parse::<i64>().map(BatchSize::new) {
                Ok(Ok(size)) => size,
                _ => {
                    tracing::warn!(
                        value = %raw,
                        "DEFAULT_BATCH_SIZE must be an integer between {} and {}, using default",
                        BatchSize::MIN,
                        BatchSize::MAX
                    );
                    BatchSize::default()
                }
            },
            None => BatchSize::default(),
        };

        Self {
            llm,
            server_host: get("SERVER_HOST").unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_or(
                "SERVER_PORT",
                get("SERVER_PORT").or_else(|| get("PORT")),
                DEFAULT_SERVER_PORT,
            ),
            default_batch_size,
            cors_allowed_origins: get("CORS_ALLOWED_ORIGINS"),
        }
    }
}

fn parse_or<T: std::str::FromStr + Copy>(key: &str, raw: Option<String>, default: T) -> T {
    match raw {
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, "Invalid numeric setting, using default");
            default
        }),
        None => default,
    }
}
