//! # AppError
//!
//! Centralized error handling for the Homeroom ecosystem.
//! Maps domain-specific failures to actionable error types.

use thiserror::Error;

/// The primary error type for all hr-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Lookup yielded no row (e.g., unknown profile token). Expected;
    /// rendered as an empty/"not found" state, never as a failure.
    #[error("{0} not found: {1}")]
    NotFound(String, String),

    /// Caller-supplied data violates a field constraint (e.g., tag too
    /// long, missing event date). Surfaced before any write is attempted.
    #[error("validation error: {0}")]
    Validation(String),

    /// No signed-in actor, or the actor does not own the target record.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Resource already exists (e.g., duplicate handle).
    #[error("conflict: {0}")]
    Conflict(String),

    /// A stored record contradicts the classification rules (e.g., unknown
    /// post kind). Rendering degrades instead of crashing.
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Backend/transport failure. Distinct from NotFound: a failed fetch
    /// must never be reported as "no such record".
    #[error("internal service error: {0}")]
    Internal(String),
}

/// A specialized Result type for Homeroom logic.
pub type Result<T> = std::result::Result<T, AppError>;
