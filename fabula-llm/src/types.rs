//! Request and response types for LLM completions.

use serde::{Deserialize, Serialize};

const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// A single completion request.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// System prompt (role and rules for the model).
    pub system: String,
    /// User prompt (context and task).
    pub user: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl CompletionRequest {
    /// Creates a request with default sampling parameters and timeout.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    /// Sets the token budget.
    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// A completion together with transport metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    /// The generated text.
    pub text: String,
    /// How many tokens the provider reported generating.
    pub tokens_generated: u32,
    /// Wall-clock latency of the HTTP call in milliseconds.
    pub latency_ms: u64,
    /// Which model produced the text.
    pub model: String,
}
