use std::time::Duration;

use anyhow::{anyhow, Context, Result};

use crate::analysis::models::{AnalysisMode, SchemaProfile};
use crate::llm_client::{ModelParams, Provider};

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 4096;
const DEFAULT_TIMEOUT_SECS: u64 = 120;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// API keys are optional at startup; a missing key is reported per request.
#[derive(Debug, Clone)]
pub struct Config {
    pub provider: Provider,
    pub anthropic_api_key: Option<String>,
    pub groq_api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub llm_timeout: Duration,
    pub analysis_mode: AnalysisMode,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let provider = match get("LLM_PROVIDER") {
            Some(raw) => raw.parse::<Provider>().map_err(|e| anyhow!(e))?,
            None => Provider::default(),
        };

        let profile = match get("SCHEMA_PROFILE") {
            Some(raw) => raw.parse::<SchemaProfile>().map_err(|e| anyhow!(e))?,
            None => SchemaProfile::default(),
        };
        let analysis_mode = match get("ANALYSIS_MODE") {
            Some(raw) => AnalysisMode::parse(&raw, profile).map_err(|e| anyhow!(e))?,
            None => AnalysisMode::StructuredJson { profile },
        };

        let temperature = parse_or("LLM_TEMPERATURE", get("LLM_TEMPERATURE"), DEFAULT_TEMPERATURE)?;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(anyhow!("LLM_TEMPERATURE must be between 0.0 and 2.0"));
        }

        Ok(Config {
            provider,
            anthropic_api_key: get("ANTHROPIC_API_KEY"),
            groq_api_key: get("GROQ_API_KEY"),
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().to_string()),
            temperature,
            max_tokens: parse_or("LLM_MAX_TOKENS", get("LLM_MAX_TOKENS"), DEFAULT_MAX_TOKENS)?,
            llm_timeout: Duration::from_secs(parse_or(
                "LLM_TIMEOUT_SECS",
                get("LLM_TIMEOUT_SECS"),
                DEFAULT_TIMEOUT_SECS,
            )?),
            analysis_mode,
            max_upload_bytes: parse_or(
                "MAX_UPLOAD_BYTES",
                get("MAX_UPLOAD_BYTES"),
                DEFAULT_MAX_UPLOAD_BYTES,
            )?,
            port: parse_or("PORT", get("PORT"), 8080)?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }

    /// The API key for the active provider, if one is configured.
    pub fn api_key(&self) -> Option<&str> {
        match self.provider {
            Provider::Anthropic => self.anthropic_api_key.as_deref(),
            Provider::Groq => self.groq_api_key.as_deref(),
        }
    }

    pub fn model_params(&self) -> ModelParams {
        ModelParams {
            model: self.model.clone(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}

fn parse_or<T>(key: &str, value: Option<String>, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match value {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
