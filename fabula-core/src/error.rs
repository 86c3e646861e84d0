//! Error types for fabula-core.

use thiserror::Error;

/// Errors that can occur in fabula-core operations.
#[derive(Error, Debug)]
pub enum FabulaError {
    /// Two characters in the same world share a name.
    #[error("duplicate character name: {0}")]
    DuplicateCharacter(String),

    /// Scenario or configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// File I/O failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience result alias for fabula-core operations.
pub type Result<T> = std::result::Result<T, FabulaError>;
