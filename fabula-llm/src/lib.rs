//! # fabula-llm: LLM transport for Fabula
//!
//! A thin, provider-routed HTTP layer for the two kinds of model calls the
//! story engine makes (narration and appraisal):
//!   - **Ollama** (local, recommended default)
//!   - **OpenAI-compatible API** (cloud)
//!   - **None** (disabled; callers use scripted collaborators instead)
//!
//! All calls go through [`LlmClient::complete`]: one attempt, a per-request
//! timeout, and structured-output recovery via [`extract::extract_json`],
//! which digs JSON out of markdown fences and surrounding prose. Prompts are
//! versioned templates in [`prompt::PromptLibrary`], builtin by default and
//! overridable from a directory of TOML files.

pub mod client;
pub mod config;
pub mod error;
pub mod extract;
pub mod prompt;
pub mod types;

pub use client::{LlmClient, LlmProvider};
pub use config::LlmConfig;
pub use error::LlmError;
pub use extract::extract_json;
pub use prompt::{PromptId, PromptLibrary};
pub use types::{CompletionRequest, CompletionResponse};
