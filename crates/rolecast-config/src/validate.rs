//! Guard rails applied after loading.

use url::Url;

use crate::defaults::MIN_INTER_REQUEST_MS;
use crate::error::{ConfigError, ConfigResult};
use crate::model::RolecastConfig;

/// Whether the configuration will drive live grants or a dry run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Grants roles; needs a bot token.
    Live,
    /// Only reads members; still needs a token to read them.
    DryRun,
    /// No remote calls at all (e.g. reading a ledger).
    Offline,
}

/// Validate `config` for the requested mode.
///
/// # Errors
///
/// Returns the first guard-rail violation found.
pub fn validate(config: &RolecastConfig, mode: RunMode) -> ConfigResult<()> {
    if config.pacing.inter_request_ms < MIN_INTER_REQUEST_MS {
        return Err(ConfigError::invalid(
            "pacing",
            "inter_request_ms",
            format!("must be at least {MIN_INTER_REQUEST_MS}"),
        ));
    }
    if config.pacing.cooldown_ms == 0 {
        return Err(ConfigError::invalid(
            "pacing",
            "cooldown_ms",
            "must be greater than zero",
        ));
    }
    if config.pacing.max_retry_after_ms < config.pacing.cooldown_ms {
        return Err(ConfigError::invalid(
            "pacing",
            "max_retry_after_ms",
            "must not be lower than cooldown_ms",
        ));
    }
    if config.progress.every == 0 {
        return Err(ConfigError::invalid(
            "progress",
            "every",
            "must be greater than zero",
        ));
    }
    if config.ledger.dir.as_os_str().is_empty() {
        return Err(ConfigError::MissingField {
            section: "ledger",
            field: "dir",
        });
    }
    if mode == RunMode::Offline {
        return Ok(());
    }

    check_url("discord", "api_base_url", &config.discord.api_base_url)?;
    check_url("paste", "base_url", &config.paste.base_url)?;
    if config.discord.timeout_secs == 0 || config.paste.timeout_secs == 0 {
        return Err(ConfigError::invalid(
            "discord",
            "timeout_secs",
            "timeouts must be greater than zero",
        ));
    }
    if config.discord.token.is_none() {
        return Err(ConfigError::MissingField {
            section: "discord",
            field: "token",
        });
    }
    Ok(())
}

fn check_url(section: &'static str, field: &'static str, value: &str) -> ConfigResult<()> {
    let url = Url::parse(value).map_err(|err| ConfigError::invalid(section, field, err.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            section,
            field,
            "scheme must be http or https",
        ));
    }
    Ok(())
}
