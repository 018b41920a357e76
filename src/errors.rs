//! Error types for f2read
//!
//! Every stage of the pipeline reports failures through [`F2ReadError`].
//! Only configuration loading treats errors as recoverable; everything else
//! aborts the run.

use thiserror::Error;

/// Main error type for the f2read pipeline
#[derive(Error, Debug)]
pub enum F2ReadError {
    /// Input path does not exist ("File" or "Folder")
    #[error("{what} not found: {path}")]
    InputNotFound { what: &'static str, path: String },

    /// Input file could not be read after resolution
    #[error("Error reading file: {path}: {source}")]
    ReadFailed {
        path: String,
        source: std::io::Error,
    },

    /// Output file could not be written
    #[error("Error writing file: {path}: {source}")]
    WriteFailed {
        path: String,
        source: std::io::Error,
    },

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Completion API errors
    #[error("Completion API error: {0}")]
    ApiError(String),

    /// Streaming errors
    #[error("Streaming error: {0}")]
    StreamingError(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type alias for f2read operations
pub type Result<T> = std::result::Result<T, F2ReadError>;

impl F2ReadError {
    /// Missing input reported as a file
    pub fn file_not_found(path: impl Into<String>) -> Self {
        F2ReadError::InputNotFound {
            what: "File",
            path: path.into(),
        }
    }

    /// Missing input reported as a folder
    pub fn folder_not_found(path: impl Into<String>) -> Self {
        F2ReadError::InputNotFound {
            what: "Folder",
            path: path.into(),
        }
    }
}
