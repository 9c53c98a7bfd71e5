use crate::domain::tts::SynthesisSettings;
use crate::infrastructure::repositories::gemini_tts_repository::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Upper bound accepted for TTS_MAX_RETRIES
pub const MAX_RETRIES_LIMIT: u32 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Speech endpoint
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub gemini_timeout_secs: u64,
    // Chunking, throttling and retry
    pub max_chars_per_batch: usize,
    pub per_line_overhead: usize,
    pub prompt_overhead: usize,
    pub inter_item_delay_ms: u64,
    pub base_retry_delay_ms: u64,
    pub max_retries: u32,
    pub max_input_chars: usize,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Read an optional variable, falling back to `default` when unset
fn var_or<T>(name: &str, default: T) -> Result<T, Box<dyn std::error::Error>>
where
    T: FromStr,
    T::Err: std::error::Error + 'static,
{
    match env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| format!("{} is invalid: {}", name, e).into()),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let defaults = SynthesisSettings::default();

        let config = Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: var_or("PORT", 8080)?,
            environment: env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "production" => Environment::Production,
                    _ => Environment::Development,
                })?,
            log_format: env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .parse::<String>()
                .map(|s| match s.as_str() {
                    "json" => LogFormat::Json,
                    _ => LogFormat::Pretty,
                })?,
            gemini_api_key: env::var("GEMINI_API_KEY")
                .map_err(|_| "GEMINI_API_KEY must be set")?,
            gemini_model: env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            gemini_base_url: env::var("GEMINI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            gemini_timeout_secs: var_or("GEMINI_TIMEOUT_SECS", 120)?,
            max_chars_per_batch: var_or("TTS_MAX_CHARS_PER_BATCH", defaults.max_chars_per_batch)?,
            per_line_overhead: var_or("TTS_PER_LINE_OVERHEAD", defaults.per_line_overhead)?,
            prompt_overhead: var_or("TTS_PROMPT_OVERHEAD", defaults.prompt_overhead)?,
            inter_item_delay_ms: var_or(
                "TTS_INTER_ITEM_DELAY_MS",
                defaults.inter_item_delay.as_millis() as u64,
            )?,
            base_retry_delay_ms: var_or(
                "TTS_BASE_RETRY_DELAY_MS",
                defaults.base_retry_delay.as_millis() as u64,
            )?,
            max_retries: var_or("TTS_MAX_RETRIES", defaults.max_retries)?,
            max_input_chars: var_or("TTS_MAX_INPUT_CHARS", defaults.max_input_chars)?,
        };

        if config.max_chars_per_batch == 0 {
            return Err("TTS_MAX_CHARS_PER_BATCH must be greater than zero".into());
        }

        if config.max_retries > MAX_RETRIES_LIMIT {
            return Err(format!(
                "TTS_MAX_RETRIES must be at most {}, got {}",
                MAX_RETRIES_LIMIT, config.max_retries
            )
            .into());
        }

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }

    pub fn gemini_timeout(&self) -> Duration {
        Duration::from_secs(self.gemini_timeout_secs)
    }

    /// Orchestration tunables handed to the TTS service
    pub fn synthesis_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            max_chars_per_batch: self.max_chars_per_batch,
            per_line_overhead: self.per_line_overhead,
            prompt_overhead: self.prompt_overhead,
            inter_item_delay: Duration::from_millis(self.inter_item_delay_ms),
            base_retry_delay: Duration::from_millis(self.base_retry_delay_ms),
            max_retries: self.max_retries,
            max_input_chars: self.max_input_chars,
        }
    }
}
