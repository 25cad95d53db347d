//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use thiserror::Error;

/// Errors that can occur while loading, indexing or querying a profile
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Malformed profile document: {0}")]
    MalformedDocument(String),

    #[error("Name pool index {index} out of range (pool holds {len} strings)")]
    OutOfRange { index: i64, len: usize },

    #[error("Invalid search pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to read profile: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProfileError {
    /// Shorthand for building a `MalformedDocument` error
    pub fn malformed(msg: impl Into<String>) -> Self {
        ProfileError::MalformedDocument(msg.into())
    }
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
