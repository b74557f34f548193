//! Error types for the artifact sync subsystem.
//!
//! Failures here are deliberately soft: a repository that cannot be fetched,
//! an artifact that fails validation, or a target path in conflict each
//! degrade to "fewer artifacts available" plus a diagnostic, never to an
//! aborted run.

use thiserror::Error;

/// Errors produced by sync, discovery, installation, and injection.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Configuration is missing, malformed, or internally inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// A git subprocess (clone, fetch, checkout, pull) failed
    #[error("Git {operation} failed: {detail}")]
    Git { operation: String, detail: String },

    /// Repository-supplied data failed schema or path-safety validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Installing an artifact into a managed directory failed
    #[error("Install error: {0}")]
    Install(String),

    /// Underlying filesystem operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SyncError {
    /// Shorthand for git errors carrying the failed operation name.
    pub fn git(operation: &str, detail: impl Into<String>) -> Self {
        SyncError::Git {
            operation: operation.to_string(),
            detail: detail.into(),
        }
    }
}
