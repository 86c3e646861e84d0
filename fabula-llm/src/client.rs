//! LLM client routing completions to Ollama or OpenAI-compatible backends.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use crate::config::LlmConfig;
use crate::error::LlmError;
use crate::types::{CompletionRequest, CompletionResponse};

/// Provider backend for LLM completions.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    /// Ollama running locally.
    Ollama {
        /// Endpoint base URL.
        base_url: String,
    },
    /// OpenAI-compatible chat completions API.
    OpenAiCompatible {
        /// Endpoint base URL.
        base_url: String,
        /// Bearer token.
        api_key: String,
    },
    /// No backend configured. Every call returns [`LlmError::Unavailable`];
    /// callers fall back to scripted collaborators.
    None,
}

/// HTTP client for LLM completions.
///
/// Each call is a single attempt with a per-request timeout. There is no
/// retry; a failed call surfaces to the turn loop, which logs it and moves
/// on without touching world state.
#[derive(Clone)]
pub struct LlmClient {
    provider: LlmProvider,
    http: Client,
    model: String,
}

impl LlmClient {
    /// Creates a client from configuration.
    ///
    /// Fails if the provider name is unknown or a required API key
    /// environment variable is unset.
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        Ok(Self {
            provider: config.resolve_provider()?,
            http: Client::new(),
            model: config.model.clone(),
        })
    }

    /// Creates a client with no backend.
    #[must_use]
    pub fn none() -> Self {
        Self {
            provider: LlmProvider::None,
            http: Client::new(),
            model: String::new(),
        }
    }

    /// Whether a backend is configured.
    #[must_use]
    pub fn is_available(&self) -> bool {
        !matches!(self.provider, LlmProvider::None)
    }

    /// Requests a completion from the configured backend.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        match &self.provider {
            LlmProvider::None => Err(LlmError::Unavailable(
                "no LLM provider configured".to_string(),
            )),
            LlmProvider::Ollama { base_url } => self.complete_ollama(base_url, request).await,
            LlmProvider::OpenAiCompatible { base_url, api_key } => {
                self.complete_openai(base_url, api_key, request).await
            }
        }
    }

    async fn complete_ollama(
        &self,
        base_url: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{base_url}/api/generate");
        let body = json!({
            "model": self.model,
            "prompt": format!("{}\n\n{}", request.system, request.user),
            "stream": false,
            "options": {
                "temperature": request.temperature,
                "num_predict": request.max_tokens,
            }
        });

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .json(&body)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(|e| classify(e, request.timeout_ms))?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "ollama returned an error status");
            return Err(LlmError::RequestFailed(format!("HTTP {status}: {body}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let text = payload["response"].as_str().unwrap_or("").to_string();
        debug!(latency_ms, model = %self.model, "ollama completion finished");

        Ok(CompletionResponse {
            text,
            tokens_generated: payload["eval_count"].as_u64().unwrap_or(0) as u32,
            latency_ms,
            model: self.model.clone(),
        })
    }

    async fn complete_openai(
        &self,
        base_url: &str,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, LlmError> {
        let url = format!("{base_url}/v1/chat/completions");
        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system },
                { "role": "user", "content": request.user },
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        let start = Instant::now();
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&body)
            .timeout(Duration::from_millis(request.timeout_ms))
            .send()
            .await
            .map_err(|e| classify(e, request.timeout_ms))?;
        let latency_ms = start.elapsed().as_millis() as u64;

        if !response.status().is_success() {
            let status = response.status();
            warn!(%status, "openai-compatible API returned an error status");
            return Err(LlmError::RequestFailed(format!("HTTP {status}")));
        }

        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let text = payload["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or("")
            .to_string();
        debug!(latency_ms, model = %self.model, "openai completion finished");

        Ok(CompletionResponse {
            text,
            tokens_generated: payload["usage"]["completion_tokens"].as_u64().unwrap_or(0) as u32,
            latency_ms,
            model: self.model.clone(),
        })
    }
}

fn classify(err: reqwest::Error, timeout_ms: u64) -> LlmError {
    if err.is_timeout() {
        LlmError::Timeout(timeout_ms)
    } else {
        LlmError::from(err)
    }
}
