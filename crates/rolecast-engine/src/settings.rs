//! Engine-side view of the pacing, progress, and ledger configuration.

use std::path::PathBuf;
use std::time::Duration;

use rolecast_config::RolecastConfig;

/// Delays applied between requests and before the rate-limit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Wait between consecutive targets (not between a request and its retry).
    pub inter_request_delay: Duration,
    /// Cooldown used when the server gives no retry-after hint.
    pub cooldown: Duration,
    /// Upper bound applied to server hints.
    pub max_retry_after: Duration,
}

impl PacingPolicy {
    /// Cooldown before retrying a rate-limited request.
    #[must_use]
    pub fn cooldown_for(&self, hint: Option<Duration>) -> Duration {
        hint.map_or(self.cooldown, |hint| hint.min(self.max_retry_after))
    }

    /// No waiting at all; used by tests and offline tooling.
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            inter_request_delay: Duration::ZERO,
            cooldown: Duration::ZERO,
            max_retry_after: Duration::ZERO,
        }
    }
}

/// Everything a run needs besides its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSettings {
    /// Request pacing.
    pub pacing: PacingPolicy,
    /// Publish a progress event after this many processed targets.
    pub progress_every: usize,
    /// Directory holding per-guild ledgers.
    pub ledger_dir: PathBuf,
}

impl RunSettings {
    /// Derive settings from validated configuration.
    #[must_use]
    pub fn from_config(config: &RolecastConfig) -> Self {
        Self {
            pacing: PacingPolicy {
                inter_request_delay: config.pacing.inter_request_delay(),
                cooldown: config.pacing.cooldown(),
                max_retry_after: config.pacing.max_retry_after(),
            },
            progress_every: config.progress.every.max(1),
            ledger_dir: config.ledger.dir.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hints_are_capped_and_missing_hints_fall_back() {
        let pacing = PacingPolicy {
            inter_request_delay: Duration::from_secs(2),
            cooldown: Duration::from_secs(1),
            max_retry_after: Duration::from_secs(10),
        };
        assert_eq!(pacing.cooldown_for(None), Duration::from_secs(1));
        assert_eq!(
            pacing.cooldown_for(Some(Duration::from_millis(3_500))),
            Duration::from_millis(3_500)
        );
        assert_eq!(
            pacing.cooldown_for(Some(Duration::from_secs(600))),
            Duration::from_secs(10)
        );
    }

    #[test]
    fn settings_follow_configuration() {
        let mut config = RolecastConfig::default();
        config.progress.every = 25;
        config.ledger.dir = PathBuf::from("/tmp/ledgers");

        let settings = RunSettings::from_config(&config);
        assert_eq!(settings.pacing.inter_request_delay, Duration::from_secs(2));
        assert_eq!(settings.pacing.cooldown, Duration::from_secs(1));
        assert_eq!(settings.pacing.max_retry_after, Duration::from_secs(10));
        assert_eq!(settings.progress_every, 25);
        assert_eq!(settings.ledger_dir, PathBuf::from("/tmp/ledgers"));
    }
}
