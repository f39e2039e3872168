//! Configuration loading: optional YAML file, then `ROLECAST_*` environment overrides.

use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::model::RolecastConfig;

/// Prefix shared by every environment override.
pub const ENV_PREFIX: &str = "ROLECAST_";

/// Load configuration from `path` (when given) and the process environment.
///
/// A missing file is an error only when a path was supplied explicitly.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or an override is malformed.
pub fn load(path: Option<&Path>) -> ConfigResult<RolecastConfig> {
    let mut config = match path {
        Some(path) => read_file(path)?,
        None => RolecastConfig::default(),
    };
    apply_env_overrides(&mut config, std::env::vars())?;
    Ok(config)
}

fn read_file(path: &Path) -> ConfigResult<RolecastConfig> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if text.trim().is_empty() {
        return Ok(RolecastConfig::default());
    }
    serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Apply `ROLECAST_*` overrides from `vars` onto `config`. Unknown keys are ignored.
///
/// `DISCORD_TOKEN` is accepted as an alias for `ROLECAST_DISCORD_TOKEN`.
///
/// # Errors
///
/// Returns an error if a numeric override does not parse.
pub fn apply_env_overrides<I>(config: &mut RolecastConfig, vars: I) -> ConfigResult<()>
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if key == "DISCORD_TOKEN" {
            if config.discord.token.is_none() {
                config.discord.token = non_empty(value);
            }
            continue;
        }
        let Some(name) = key.strip_prefix(ENV_PREFIX) else {
            continue;
        };
        debug!(key = %key, "applying configuration override");
        match name {
            "DISCORD_API_BASE_URL" => config.discord.api_base_url = value,
            "DISCORD_TOKEN" => config.discord.token = non_empty(value),
            "DISCORD_TIMEOUT_SECS" => {
                config.discord.timeout_secs = parse_number("discord", "timeout_secs", &value)?;
            }
            "PASTE_BASE_URL" => config.paste.base_url = value,
            "PASTE_TIMEOUT_SECS" => {
                config.paste.timeout_secs = parse_number("paste", "timeout_secs", &value)?;
            }
            "INTER_REQUEST_MS" => {
                config.pacing.inter_request_ms =
                    parse_number("pacing", "inter_request_ms", &value)?;
            }
            "COOLDOWN_MS" => {
                config.pacing.cooldown_ms = parse_number("pacing", "cooldown_ms", &value)?;
            }
            "MAX_RETRY_AFTER_MS" => {
                config.pacing.max_retry_after_ms =
                    parse_number("pacing", "max_retry_after_ms", &value)?;
            }
            "LEDGER_DIR" => config.ledger.dir = value.into(),
            "PROGRESS_EVERY" => {
                config.progress.every = parse_number("progress", "every", &value)?;
            }
            "ALLOWED_USER_IDS" => config.access.allowed_user_ids = split_list(&value),
            "ALLOWED_ROLE_IDS" => config.access.allowed_role_ids = split_list(&value),
            "LOG_LEVEL" => config.logging.level = value,
            "LOG_FORMAT" => config.logging.format = non_empty(value),
            _ => {}
        }
    }
    Ok(())
}

fn parse_number<T: FromStr>(
    section: &'static str,
    field: &'static str,
    value: &str,
) -> ConfigResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::invalid(section, field, format!("'{value}' is not a number")))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Whether `path` points at a readable file; used to pick up an optional default file.
#[must_use]
pub fn file_exists(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file(),
        Err(err) if err.kind() == io::ErrorKind::NotFound => false,
        Err(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn overrides_replace_defaults() -> ConfigResult<()> {
        let mut config = RolecastConfig::default();
        apply_env_overrides(
            &mut config,
            vars(&[
                ("ROLECAST_INTER_REQUEST_MS", "750"),
                ("ROLECAST_COOLDOWN_MS", "1500"),
                ("ROLECAST_PROGRESS_EVERY", "10"),
                ("ROLECAST_ALLOWED_ROLE_IDS", " 1, 2 ,,3"),
                ("ROLECAST_LEDGER_DIR", "/var/lib/rolecast"),
                ("UNRELATED", "ignored"),
            ]),
        )?;
        assert_eq!(config.pacing.inter_request_ms, 750);
        assert_eq!(config.pacing.cooldown_ms, 1_500);
        assert_eq!(config.progress.every, 10);
        assert_eq!(config.access.allowed_role_ids, vec!["1", "2", "3"]);
        assert_eq!(config.ledger.dir, Path::new("/var/lib/rolecast"));
        Ok(())
    }

    #[test]
    fn discord_token_alias_does_not_override_prefixed_value() -> ConfigResult<()> {
        let mut config = RolecastConfig::default();
        apply_env_overrides(
            &mut config,
            vars(&[
                ("ROLECAST_DISCORD_TOKEN", "primary"),
                ("DISCORD_TOKEN", "fallback"),
            ]),
        )?;
        assert_eq!(config.discord.token.as_deref(), Some("primary"));

        let mut config = RolecastConfig::default();
        apply_env_overrides(&mut config, vars(&[("DISCORD_TOKEN", "fallback")]))?;
        assert_eq!(config.discord.token.as_deref(), Some("fallback"));
        Ok(())
    }

    #[test]
    fn malformed_number_names_the_field() {
        let mut config = RolecastConfig::default();
        let err = apply_env_overrides(&mut config, vars(&[("ROLECAST_COOLDOWN_MS", "soon")]))
            .expect_err("non-numeric override");
        assert!(matches!(
            err,
            ConfigError::InvalidField {
                section: "pacing",
                field: "cooldown_ms",
                ..
            }
        ));
    }
}
