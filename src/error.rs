// src/error.rs

//! Unified error handling for the bridge calendar sync.

use std::fmt;

use thiserror::Error;

/// Result type alias for sync operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// AWS S3 error
    #[cfg(feature = "s3")]
    #[error("S3 error: {0}")]
    S3(String),

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// A closure record is missing a field or has an unexpected shape.
    #[error("Malformed closure record #{position}: field `{field}` {message}")]
    MalformedRecord {
        position: usize,
        field: &'static str,
        message: String,
    },

    /// Open-data feed returned something unusable
    #[error("Feed error: {0}")]
    Feed(String),

    /// Token could not be loaded or refreshed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Calendar API answered with a non-success status
    #[error("Calendar API error ({status}): {message}")]
    Calendar { status: u16, message: String },

    /// Refresh guard refused to clear the calendar
    #[error(
        "Refresh aborted: {published} published events would be replaced by {incoming} ({reason})"
    )]
    RefreshAborted {
        published: usize,
        incoming: usize,
        reason: String,
    },
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a malformed record error.
    pub fn malformed(position: usize, field: &'static str, message: impl fmt::Display) -> Self {
        Self::MalformedRecord {
            position,
            field,
            message: message.to_string(),
        }
    }

    /// Create a feed error.
    pub fn feed(message: impl Into<String>) -> Self {
        Self::Feed(message.into())
    }

    /// Create an authentication error.
    pub fn auth(message: impl fmt::Display) -> Self {
        Self::Auth(message.to_string())
    }

    /// Create a calendar API error.
    pub fn calendar(status: u16, message: impl Into<String>) -> Self {
        Self::Calendar {
            status,
            message: message.into(),
        }
    }
}
