//! Error types for the skein solver.
//!
//! Construction and I/O paths return `SkeinResult<T>`. The per-frame
//! solve never returns an error: convergence and numerical problems are
//! reported as data in the solver result.

use thiserror::Error;

/// Unified error type for the skein workspace.
#[derive(Debug, Error)]
pub enum SkeinError {
    /// Body data is malformed or inconsistent.
    #[error("Invalid body: {0}")]
    InvalidBody(String),

    /// Configuration value is invalid.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Convenience alias for `Result<T, SkeinError>`.
pub type SkeinResult<T> = Result<T, SkeinError>;
