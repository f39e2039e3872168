//! Typed configuration sections.
//!
//! # Design
//! - Pure data carriers; every section deserializes with defaults so partial files work.
//! - The bot token never appears in `Debug` output.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Complete Rolecast configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RolecastConfig {
    /// Discord REST settings.
    pub discord: DiscordConfig,
    /// Paste service settings.
    pub paste: PasteConfig,
    /// Request pacing and rate-limit handling.
    pub pacing: PacingConfig,
    /// Ledger storage.
    pub ledger: LedgerConfig,
    /// Progress reporting cadence.
    pub progress: ProgressConfig,
    /// Actor allow-lists for the command gate.
    pub access: AccessConfig,
    /// Log output.
    pub logging: LoggingSettings,
}

/// Discord REST settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DiscordConfig {
    /// API base URL, including the version segment.
    pub api_base_url: String,
    /// Bot token; required for live runs.
    pub token: Option<String>,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            api_base_url: defaults::DISCORD_API_BASE_URL.to_string(),
            token: None,
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl fmt::Debug for DiscordConfig {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DiscordConfig")
            .field("api_base_url", &self.api_base_url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl DiscordConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Paste service settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PasteConfig {
    /// Raw-content base URL; the paste id is appended as the last path segment.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout_secs: u64,
}

impl Default for PasteConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::PASTE_BASE_URL.to_string(),
            timeout_secs: defaults::HTTP_TIMEOUT_SECS,
        }
    }
}

impl PasteConfig {
    /// Request timeout as a `Duration`.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Request pacing and rate-limit handling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PacingConfig {
    /// Delay between consecutive requests.
    pub inter_request_ms: u64,
    /// Cooldown before the rate-limit retry when no hint is given.
    pub cooldown_ms: u64,
    /// Ceiling for server-provided retry-after hints.
    pub max_retry_after_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            inter_request_ms: defaults::INTER_REQUEST_MS,
            cooldown_ms: defaults::COOLDOWN_MS,
            max_retry_after_ms: defaults::MAX_RETRY_AFTER_MS,
        }
    }
}

impl PacingConfig {
    /// Inter-request delay.
    #[must_use]
    pub const fn inter_request_delay(&self) -> Duration {
        Duration::from_millis(self.inter_request_ms)
    }

    /// Fallback rate-limit cooldown.
    #[must_use]
    pub const fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Retry-after ceiling.
    #[must_use]
    pub const fn max_retry_after(&self) -> Duration {
        Duration::from_millis(self.max_retry_after_ms)
    }
}

/// Ledger storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LedgerConfig {
    /// Directory that holds `{guild_id}.log` files.
    pub dir: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(defaults::LEDGER_DIR),
        }
    }
}

/// Progress reporting cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ProgressConfig {
    /// Emit a progress event after this many processed targets.
    pub every: usize,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            every: defaults::PROGRESS_EVERY,
        }
    }
}

/// Actor allow-lists consulted by the command gate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessConfig {
    /// Users allowed regardless of their roles.
    pub allowed_user_ids: Vec<String>,
    /// Holding any of these roles grants access.
    pub allowed_role_ids: Vec<String>,
}

/// Log output.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter level (overridden by `RUST_LOG`).
    pub level: String,
    /// `json` or `pretty`; inferred from the build profile when absent.
    pub format: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            format: None,
        }
    }
}
