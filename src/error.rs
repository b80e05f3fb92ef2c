//! # Error Types
//!
//! Custom error types for AMON Ground using `thiserror`.

use thiserror::Error;

/// Main error type for AMON Ground
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Sample buffers must hold at least one value
    #[error("Invalid buffer length: {0} (must be at least 1)")]
    InvalidBufferLength(usize),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Backend answered with a non-success status
    #[error("Backend error: {0}")]
    Backend(String),

    /// HTTP transport errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Chart snapshot export errors
    #[error("Snapshot error: {0}")]
    Snapshot(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for AMON Ground
pub type Result<T> = std::result::Result<T, DashboardError>;
