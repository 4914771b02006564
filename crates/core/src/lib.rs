//! Shared primitives for all Rust crates in Certwatch.

#![forbid(unsafe_code)]

use thiserror::Error;

/// Result type used across Certwatch crates.
pub type AppResult<T> = Result<T, AppError>;

/// Common application error categories.
#[derive(Debug, Error)]
pub enum AppError {
    /// Invalid input or violated invariant.
    #[error("validation error: {0}")]
    Validation(String),

    /// Requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Write operation conflicts with existing state.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Stored state references data that no longer exists upstream.
    #[error("data integrity error: {0}")]
    DataIntegrity(String),

    /// Internal unexpected error.
    #[error("internal error: {0}")]
    Internal(String),
}
