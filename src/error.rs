//! Error types for iterloop
//!
//! Centralized error handling using thiserror.

use std::path::PathBuf;
use thiserror::Error;

/// All error types that can occur in iterloop
#[derive(Debug, Error)]
pub enum IterloopError {
    /// A loop is already active in this context
    #[error("Loop already active. Use 'cancel' first or 'check' to continue.")]
    LoopAlreadyActive,

    /// No loop is active in this context
    #[error("No active loop.")]
    NoActiveLoop,

    /// Persisted state could not be read or violates its invariants
    #[error("Malformed loop state at {}: {reason}", .path.display())]
    MalformedState { path: PathBuf, reason: String },

    /// Caller supplied input the controller cannot act on
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Storage/persistence error
    #[error("Storage error: {0}")]
    Storage(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for iterloop operations
pub type Result<T> = std::result::Result<T, IterloopError>;
