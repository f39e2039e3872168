use std::fs;

use rolecast_config::{ConfigError, RolecastConfig, RunMode, load, validate};

#[test]
fn partial_yaml_file_keeps_defaults_for_missing_sections() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rolecast.yaml");
    fs::write(
        &path,
        "discord:\n  token: abc\npacing:\n  inter_request_ms: 500\naccess:\n  allowed_user_ids: [\"388931035607597057\"]\n",
    )?;

    let config = load(Some(&path))?;

    assert_eq!(config.discord.token.as_deref(), Some("abc"));
    assert_eq!(config.pacing.inter_request_ms, 500);
    assert_eq!(config.pacing.cooldown_ms, 1_000);
    assert_eq!(config.progress.every, 50);
    assert_eq!(config.access.allowed_user_ids, vec!["388931035607597057"]);
    validate(&config, RunMode::Live)?;
    Ok(())
}

#[test]
fn empty_file_yields_defaults() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("empty.yaml");
    fs::write(&path, "  \n")?;
    let config = load(Some(&path))?;
    assert_eq!(config.paste, RolecastConfig::default().paste);
    Ok(())
}

#[test]
fn missing_explicit_file_is_an_io_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let err = load(Some(&dir.path().join("absent.yaml"))).expect_err("file is absent");
    assert!(matches!(err, ConfigError::Io { .. }));
    Ok(())
}

#[test]
fn malformed_yaml_is_a_parse_error() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("broken.yaml");
    fs::write(&path, "pacing:\n  inter_request_ms: [oops\n")?;
    let err = load(Some(&path)).expect_err("broken yaml");
    assert!(matches!(err, ConfigError::Parse { .. }));
    Ok(())
}
