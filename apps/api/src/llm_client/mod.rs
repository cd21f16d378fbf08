//! LLM transport: the single point of entry for all model API calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! The analyzer receives an `Arc<dyn ModelTransport>` at startup and never
//! holds a client of its own.
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod anthropic;
pub mod groq;
pub mod prompts;

pub use anthropic::AnthropicClient;
pub use groq::GroqClient;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No API key configured for {0}")]
    MissingApiKey(Provider),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("LLM call timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// The external model providers the analyzer can be wired to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Anthropic,
    Groq,
}

impl Provider {
    pub fn as_str(self) -> &'static str {
        match self {
            Provider::Anthropic => "anthropic",
            Provider::Groq => "groq",
        }
    }

    /// Model used when `LLM_MODEL` is not set.
    pub fn default_model(self) -> &'static str {
        match self {
            Provider::Anthropic => "claude-3-haiku-20240307",
            Provider::Groq => "llama-3.3-70b-versatile",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn api_key_var(self) -> &'static str {
        match self {
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "anthropic" | "claude" => Ok(Provider::Anthropic),
            "groq" => Ok(Provider::Groq),
            other => Err(format!(
                "unknown LLM provider '{other}' (expected 'anthropic' or 'groq')"
            )),
        }
    }
}

/// Per-call generation parameters sent alongside the prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A request/response call to a hosted language model.
///
/// Implementations must check for a credential before touching the network
/// and return `LlmError::MissingApiKey` when none is configured.
#[async_trait]
pub trait ModelTransport: Send + Sync {
    fn provider(&self) -> Provider;

    fn has_credential(&self) -> bool;

    /// Sends `prompt` (with `system` instructions) and returns the raw text reply.
    async fn complete(
        &self,
        prompt: &str,
        system: &str,
        params: &ModelParams,
    ) -> Result<String, LlmError>;
}

/// Builds the transport for `provider`. A missing key is not an error here;
/// it surfaces per request so the service can still start and report it.
pub fn build_transport(
    provider: Provider,
    api_key: Option<String>,
    timeout: Duration,
) -> Result<Arc<dyn ModelTransport>, LlmError> {
    let transport: Arc<dyn ModelTransport> = match provider {
        Provider::Anthropic => Arc::new(AnthropicClient::new(api_key, timeout)?),
        Provider::Groq => Arc::new(GroqClient::new(api_key, timeout)?),
    };
    Ok(transport)
}

pub(crate) fn http_client(timeout: Duration) -> Result<Client, LlmError> {
    Ok(Client::builder().timeout(timeout).build()?)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
