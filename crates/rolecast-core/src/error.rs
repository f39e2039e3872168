//! # Design
//!
//! - `FetchError` is fatal to a run and is raised before any mutation is attempted.
//! - `ApiError` classifies remote API failures so the executor can map them onto outcomes.
//! - Messages stay constant; context travels in fields and preserved sources.

use std::error::Error;
use std::time::Duration;

use thiserror::Error;

/// Result alias for source fetches.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result alias for remote guild API calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure retrieving the raw target list.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The source could not be reached.
    #[error("failed to reach source")]
    Request {
        /// URL that was requested.
        url: String,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The source answered with a non-success status.
    #[error("failed to fetch source data (status {status})")]
    Status {
        /// URL that was requested.
        url: String,
        /// HTTP status code returned.
        status: u16,
    },
    /// The response body could not be read as text.
    #[error("failed to read source body")]
    Body {
        /// URL that was requested.
        url: String,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

/// Failure talking to the remote guild API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The member (or guild/role) does not exist.
    #[error("remote resource not found")]
    NotFound {
        /// Operation identifier.
        operation: &'static str,
    },
    /// The API rejected the call with a rate-limit status.
    #[error("remote api rate limited")]
    RateLimited {
        /// Operation identifier.
        operation: &'static str,
        /// Server-provided wait hint, when present.
        retry_after: Option<Duration>,
    },
    /// The API returned an unexpected status.
    #[error("remote api returned unexpected status")]
    Status {
        /// Operation identifier.
        operation: &'static str,
        /// HTTP status code returned.
        status: u16,
    },
    /// The request did not complete.
    #[error("remote api transport failure")]
    Transport {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying transport failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
    /// The response payload could not be decoded.
    #[error("remote api response could not be decoded")]
    Decode {
        /// Operation identifier.
        operation: &'static str,
        /// Underlying decode failure.
        #[source]
        source: Box<dyn Error + Send + Sync>,
    },
}

impl ApiError {
    /// One-line description including the operation and the innermost cause.
    #[must_use]
    pub fn detail(&self) -> String {
        match self {
            Self::Status { operation, status } => format!("{operation}: {self} ({status})"),
            Self::Transport { operation, source } | Self::Decode { operation, source } => {
                format!("{operation}: {self}: {source}")
            }
            Self::NotFound { operation } | Self::RateLimited { operation, .. } => {
                format!("{operation}: {self}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn fetch_error_messages_carry_status() {
        let err = FetchError::Status {
            url: "https://paste.example/raw/abc".to_string(),
            status: 404,
        };
        assert_eq!(err.to_string(), "failed to fetch source data (status 404)");

        let err = FetchError::Request {
            url: "https://paste.example/raw/abc".to_string(),
            source: Box::new(io::Error::other("connection refused")),
        };
        assert_eq!(err.to_string(), "failed to reach source");
        assert!(err.source().is_some());
    }

    #[test]
    fn api_error_detail_includes_context() {
        let status = ApiError::Status {
            operation: "grant_role",
            status: 403,
        };
        assert_eq!(
            status.detail(),
            "grant_role: remote api returned unexpected status (403)"
        );

        let transport = ApiError::Transport {
            operation: "member",
            source: Box::new(io::Error::other("timed out")),
        };
        assert_eq!(
            transport.detail(),
            "member: remote api transport failure: timed out"
        );
    }
}
