//! # Design
//!
//! - `RunError` covers the conditions that stop a run before any target is mutated.
//! - Per-target failures are never errors here; they are outcomes inside the summary.
//! - `LedgerError` keeps the path and operation so a failed write can be logged in full.

use std::io;
use std::path::PathBuf;

use rolecast_core::FetchError;
use thiserror::Error;

/// Result alias for orchestrator runs.
pub type RunResult<T> = Result<T, RunError>;

/// Result alias for ledger operations.
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Conditions that abort a run without a summary.
#[derive(Debug, Error)]
pub enum RunError {
    /// The caller was not authorized to start a run.
    #[error("not authorized to start a run")]
    Unauthorized {
        /// Guild the run targeted.
        guild_id: String,
    },
    /// Another run for the same guild is active.
    #[error("a run is already active for this guild")]
    Busy {
        /// Guild the run targeted.
        guild_id: String,
    },
    /// This orchestrator instance has already been used.
    #[error("orchestrator has already been started")]
    AlreadyStarted,
    /// The target list could not be fetched.
    #[error("failed to fetch targets")]
    Fetch {
        /// Source identifier that was requested.
        source_id: String,
        /// Underlying fetch failure.
        #[source]
        source: FetchError,
    },
}

impl RunError {
    /// Message suitable for showing to the person who triggered the run.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { source, .. } => source.to_string(),
            other => other.to_string(),
        }
    }
}

/// Ledger file failures.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// A filesystem call failed.
    #[error("ledger io failed")]
    Io {
        /// Operation identifier.
        operation: &'static str,
        /// Ledger file or directory involved.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

impl LedgerError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_failures_surface_the_source_message() {
        let err = RunError::Fetch {
            source_id: "abc".to_string(),
            source: FetchError::Status {
                url: "https://paste.example/raw/abc".to_string(),
                status: 404,
            },
        };
        assert_eq!(err.to_string(), "failed to fetch targets");
        assert_eq!(
            err.user_message(),
            "failed to fetch source data (status 404)"
        );
        assert_eq!(
            RunError::AlreadyStarted.user_message(),
            "orchestrator has already been started"
        );
    }
}
