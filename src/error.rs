//! Error types for the search client.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SauceError>;

/// Errors that can occur while searching.
///
/// The server-reported kinds are flat variants. Use [`SauceError::is_limit_reached`]
/// and [`SauceError::is_unknown_api`] to match whole families at once.
#[derive(Error, Debug)]
pub enum SauceError {
    /// The API key was rejected, either with HTTP 403 or silently ignored.
    #[error("Invalid API key")]
    BadKey,

    /// The uploaded image exceeds the server's size limit (HTTP 413).
    #[error("File is too large")]
    FileTooLarge,

    /// The per-30-seconds quota is exhausted.
    #[error("30 seconds limit reached")]
    ShortLimitReached,

    /// The per-24-hours quota is exhausted.
    #[error("24 hours limit reached")]
    LongLimitReached,

    /// The header reported a negative status.
    #[error("Unknown client error, status < 0")]
    UnknownClient,

    /// The header reported a positive status or a negative user id.
    #[error("Unknown server error: {0}")]
    UnknownServer(&'static str),

    /// The server answered with a status code this client has no mapping for.
    #[error("Unknown API error, HTTP {status}")]
    UnknownApi { status: u16 },

    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A result record lacks a field its kind requires.
    #[error("Result #{index} is missing required field '{field}'")]
    MissingField { index: usize, field: &'static str },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl SauceError {
    /// Returns true for either quota error.
    pub fn is_limit_reached(&self) -> bool {
        matches!(self, Self::ShortLimitReached | Self::LongLimitReached)
    }

    /// Returns true for errors the server reported without a specific meaning.
    pub fn is_unknown_api(&self) -> bool {
        matches!(
            self,
            Self::UnknownApi { .. } | Self::UnknownClient | Self::UnknownServer(_)
        )
    }
}
