//! Default values for configuration sections.
//!
//! # Design
//! - Keep pacing constants explicit; they are sized against the remote API's sustained ceiling.

/// Discord REST base URL (API v10).
pub const DISCORD_API_BASE_URL: &str = "https://discord.com/api/v10";
/// Raw-content endpoint of the paste service.
pub const PASTE_BASE_URL: &str = "https://pastebin.com/raw";
/// HTTP timeout applied to both remote services.
pub const HTTP_TIMEOUT_SECS: u64 = 10;
/// Delay between consecutive mutation requests.
pub const INTER_REQUEST_MS: u64 = 2_000;
/// Lowest accepted inter-request delay.
pub const MIN_INTER_REQUEST_MS: u64 = 250;
/// Cooldown before the single rate-limit retry when the server gives no hint.
pub const COOLDOWN_MS: u64 = 1_000;
/// Upper bound applied to server-provided retry-after hints.
pub const MAX_RETRY_AFTER_MS: u64 = 10_000;
/// Progress cadence in processed targets.
pub const PROGRESS_EVERY: usize = 50;
/// Directory holding one ledger file per guild.
pub const LEDGER_DIR: &str = "ledgers";
/// Log level when neither config nor `RUST_LOG` provide one.
pub const LOG_LEVEL: &str = "info";
