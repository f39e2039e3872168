//! Output renderers for run events, summaries, and ledgers.

use anyhow::anyhow;
use rolecast_core::RunSummary;
use rolecast_events::{Event, EventEnvelope};
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::client::{CliError, CliResult};

/// Line printed for a live event, if the event is user-facing in this format.
pub(crate) fn event_line(
    envelope: &EventEnvelope,
    format: OutputFormat,
) -> CliResult<Option<String>> {
    match format {
        OutputFormat::Json => to_json(envelope).map(Some),
        OutputFormat::Text => Ok(match &envelope.event {
            Event::RunStarted { total: 0, .. } => {
                Some("no valid user IDs found in the paste.".to_string())
            }
            Event::RunStarted {
                total,
                dry_run: true,
                ..
            } => Some(format!("dry run: checking {total} users")),
            Event::RunStarted { total, .. } => {
                Some(format!("starting to assign role to {total} users"))
            }
            Event::Progress {
                processed,
                total,
                success,
                failed,
                ..
            } => Some(format!(
                "progress: {processed}/{total} ({success} ok, {failed} failed)"
            )),
            Event::RunCompleted { .. } | Event::RunFailed { .. } => None,
        }),
    }
}

/// Final report for a run. An empty run already said so when it started, so text output
/// has nothing more to add.
pub(crate) fn render_summary(
    summary: &RunSummary,
    format: OutputFormat,
) -> CliResult<Option<String>> {
    match format {
        OutputFormat::Json => to_json_pretty(summary).map(Some),
        OutputFormat::Text if summary.processed() == 0 => Ok(None),
        OutputFormat::Text => Ok(Some(summary.to_string())),
    }
}

#[derive(Serialize)]
struct LedgerView<'a> {
    guild_id: &'a str,
    entries: &'a [String],
}

pub(crate) fn render_ledger(
    guild_id: &str,
    entries: &[String],
    format: OutputFormat,
) -> CliResult<String> {
    match format {
        OutputFormat::Json => to_json_pretty(&LedgerView { guild_id, entries }),
        OutputFormat::Text if entries.is_empty() => {
            Ok(format!("ledger for guild {guild_id} is empty"))
        }
        OutputFormat::Text => Ok(entries.join("\n")),
    }
}

fn to_json<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}

fn to_json_pretty<T: Serialize>(value: &T) -> CliResult<String> {
    serde_json::to_string_pretty(value)
        .map_err(|err| CliError::failure(anyhow!("failed to format JSON: {err}")))
}
