//! LLM transport configuration.
//!
//! Every field has a serde default, so an empty `[llm]` table (or no table
//! at all) yields a working configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::LlmProvider;
use crate::error::LlmError;

/// Default Ollama endpoint.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";
/// Default OpenAI endpoint.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Configuration for the LLM backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Which backend to use: `"ollama"`, `"openai"`, or `"none"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Base URL override. When unset, the provider's default endpoint is
    /// used (`http://localhost:11434` for Ollama, `https://api.openai.com`
    /// for OpenAI).
    #[serde(default)]
    pub base_url: Option<String>,
    /// Model name passed to the provider.
    #[serde(default = "default_model")]
    pub model: String,
    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Name of the environment variable holding the API key. Only read for
    /// the `"openai"` provider; defaults to `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Directory of TOML prompt templates overriding the builtins.
    #[serde(default)]
    pub prompts_dir: Option<PathBuf>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_url: None,
            model: default_model(),
            timeout_ms: default_timeout_ms(),
            api_key_env: None,
            prompts_dir: None,
        }
    }
}

impl LlmConfig {
    /// Resolves this configuration into a concrete [`LlmProvider`].
    ///
    /// For `"openai"` the API key is read from the environment variable
    /// named by `api_key_env`. The key never appears in config files.
    pub fn resolve_provider(&self) -> Result<LlmProvider, LlmError> {
        match self.provider.as_str() {
            "none" => Ok(LlmProvider::None),
            "ollama" => Ok(LlmProvider::Ollama {
                base_url: self.base_url_or(OLLAMA_BASE_URL),
            }),
            "openai" => {
                let var = self.api_key_env.as_deref().unwrap_or("OPENAI_API_KEY");
                let api_key = std::env::var(var).map_err(|_| {
                    LlmError::Config(format!("api key environment variable {var} is not set"))
                })?;
                Ok(LlmProvider::OpenAiCompatible {
                    base_url: self.base_url_or(OPENAI_BASE_URL),
                    api_key,
                })
            }
            other => Err(LlmError::Config(format!(
                "unknown provider {other:?} (expected \"ollama\", \"openai\", or \"none\")"
            ))),
        }
    }

    fn base_url_or(&self, fallback: &str) -> String {
        self.base_url
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_provider() -> String {
    "ollama".to_string()
}

fn default_model() -> String {
    "llama3.2".to_string()
}

fn default_timeout_ms() -> u64 {
    30_000
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
