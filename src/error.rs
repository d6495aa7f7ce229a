//! Error types for qrng-nist

use thiserror::Error;

/// Main error type for qrng-nist operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("QRNG error: {0}")]
    Qrng(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    Unimplemented(String),

    #[error("Parse error on line {line}: {value:?} is not a 32-bit unsigned integer")]
    Parse { line: usize, value: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for qrng-nist operations
pub type Result<T> = std::result::Result<T, Error>;
