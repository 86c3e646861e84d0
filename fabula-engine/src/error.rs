//! Engine error types.

use thiserror::Error;

/// Errors that can occur while running a story session.
///
/// None of these are fatal to a session: the turn loop reports the error,
/// leaves world state as it was, and keeps accepting input.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The LLM transport failed (unreachable, timeout, bad status).
    #[error(transparent)]
    Llm(#[from] fabula_llm::LlmError),

    /// A collaborator response could not be interpreted as the expected
    /// JSON shape.
    #[error("malformed collaborator response: {0}")]
    Malformed(String),

    /// Serializing a snapshot for a prompt failed.
    #[error("snapshot serialization failed: {0}")]
    Serialization(String),
}
