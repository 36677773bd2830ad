//! Error taxonomy for the annotation engine.
//!
//! All validation fails fast before any write, and every failure maps to
//! one of these variants. The HTTP boundary translates them into a
//! structured `{code, message}` response; nothing is retried
//! automatically.

use thiserror::Error;

/// Errors produced by the annotation engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The project name does not resolve to a known project.
    #[error("project not found")]
    ProjectNotFound,

    /// The image id does not resolve on read or delete.
    #[error("image not found: {0}")]
    ImageNotFound(String),

    /// A shape annotation failed validation. No partial state is
    /// committed when this is returned.
    #[error("invalid annotation: {0}")]
    InvalidAnnotation(String),

    /// Structurally invalid payload (e.g. undecodable base64 content).
    /// Treated identically to [`EngineError::InvalidAnnotation`] by
    /// callers.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A storage-port failure. Propagated as-is; the store is expected
    /// to handle its own connection retry/backoff.
    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

/// Convenience alias used throughout the engine.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
