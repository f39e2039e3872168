//! Errors raised while constructing HTTP adapters.

use thiserror::Error;

/// Result alias for adapter construction.
pub type HttpSetupResult<T> = Result<T, HttpSetupError>;

/// Adapter construction failures.
#[derive(Debug, Error)]
pub enum HttpSetupError {
    /// The configured base URL did not parse.
    #[error("invalid base url")]
    InvalidBaseUrl {
        /// Value that failed to parse.
        value: String,
        /// Underlying parse error.
        source: url::ParseError,
    },
    /// The base URL cannot carry path segments (e.g. `mailto:`).
    #[error("base url cannot carry path segments")]
    UnsupportedBaseUrl {
        /// Offending value.
        value: String,
    },
    /// The bot token cannot be sent as a header value.
    #[error("bot token contains invalid header characters")]
    InvalidToken,
    /// Building the underlying HTTP client failed.
    #[error("failed to build http client")]
    Client {
        /// Underlying reqwest error.
        source: reqwest::Error,
    },
}
