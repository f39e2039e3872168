//! `rolecast ledger show`: print a guild's ledger of verified grants.

use rolecast_config::{RunMode, validate};
use rolecast_engine::RunLedger;

use crate::cli::LedgerShowArgs;
use crate::client::{CliContext, CliError, CliResult};
use crate::output::render_ledger;

pub(crate) async fn handle_ledger_show(ctx: &CliContext, args: LedgerShowArgs) -> CliResult<()> {
    let guild_id = args.guild.trim();
    if guild_id.is_empty() || !guild_id.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(CliError::validation("guild id must be numeric"));
    }
    validate(&ctx.config, RunMode::Offline).map_err(|err| {
        CliError::failure(anyhow::Error::new(err).context("invalid configuration"))
    })?;
    let path = RunLedger::path_for(&ctx.config.ledger.dir, guild_id);
    let entries = RunLedger::read_entries(&path)
        .await
        .map_err(|err| CliError::failure(anyhow::Error::new(err)))?;
    println!("{}", render_ledger(guild_id, &entries, ctx.output)?);
    Ok(())
}
