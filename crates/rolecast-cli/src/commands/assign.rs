//! `rolecast assign`: wire the HTTP adapters into an orchestrator and report as it runs.

use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use rolecast_config::{RunMode, validate};
use rolecast_core::TargetId;
use rolecast_engine::{BatchOrchestrator, RunError, RunRegistry, RunRequest, RunSettings};
use rolecast_events::{EventBus, EventStream};
use rolecast_http::{DiscordClient, PasteClient};
use rolecast_telemetry::Metrics;
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_stream::StreamExt;
use uuid::Uuid;

use crate::access::ActorGate;
use crate::cli::{AssignArgs, OutputFormat};
use crate::client::{CliContext, CliError, CliResult};
use crate::output::{event_line, render_summary};

const PERMISSION_DENIED: &str = "you don't have permission to use this command.";
const EVENT_DRAIN_GRACE: Duration = Duration::from_secs(2);

pub(crate) async fn handle_assign(ctx: &CliContext, args: AssignArgs) -> CliResult<()> {
    let args = checked_arguments(args)?;

    let gate = ActorGate::from_config(&ctx.config.access);
    let authorized = gate.permits(args.actor.as_deref(), &args.actor_roles);

    let mode = if args.dry_run {
        RunMode::DryRun
    } else {
        RunMode::Live
    };
    validate(&ctx.config, mode).map_err(|err| {
        CliError::failure(anyhow::Error::new(err).context("invalid configuration"))
    })?;

    let token = ctx
        .config
        .discord
        .token
        .as_deref()
        .ok_or_else(|| CliError::failure(anyhow!("discord token is not configured")))?;
    let discord = DiscordClient::new(
        &ctx.config.discord.api_base_url,
        token,
        ctx.config.discord.timeout(),
    )
    .map_err(|err| CliError::failure(anyhow::Error::new(err).context("discord client")))?;
    let paste = PasteClient::new(&ctx.config.paste.base_url, ctx.config.paste.timeout())
        .map_err(|err| CliError::failure(anyhow::Error::new(err).context("paste client")))?;
    let metrics = Metrics::new().map_err(|err| CliError::failure(anyhow::Error::new(err)))?;

    let events = EventBus::new();
    let orchestrator = BatchOrchestrator::new(
        Arc::new(paste),
        Arc::new(discord),
        events.clone(),
        metrics.clone(),
        RunRegistry::new(),
        RunSettings::from_config(&ctx.config),
    );
    let printer = spawn_printer(events.subscribe(None), orchestrator.run_id(), ctx.output);

    let result = orchestrator
        .run(RunRequest {
            source_id: args.paste_id,
            capability_id: args.role_id,
            container_id: args.guild,
            dry_run: args.dry_run,
            authorized,
        })
        .await;

    match result {
        Ok(summary) => {
            drain(printer).await;
            if let Some(text) = render_summary(&summary, ctx.output)? {
                println!("{text}");
            }
            if args.metrics {
                let text = metrics
                    .render()
                    .map_err(|err| CliError::failure(anyhow::Error::new(err)))?;
                print!("{text}");
            }
            Ok(())
        }
        Err(err @ RunError::Fetch { .. }) => {
            drain(printer).await;
            Err(CliError::failure(err))
        }
        Err(RunError::Unauthorized { .. }) => {
            printer.abort();
            Err(CliError::validation(PERMISSION_DENIED))
        }
        Err(err) => {
            printer.abort();
            Err(CliError::failure(err))
        }
    }
}

/// Trim and validate the identifiers; everything downstream sees the trimmed values.
fn checked_arguments(mut args: AssignArgs) -> CliResult<AssignArgs> {
    args.paste_id = args.paste_id.trim().to_string();
    args.role_id = args.role_id.trim().to_string();
    args.guild = args.guild.trim().to_string();

    if args.paste_id.is_empty() || args.paste_id.contains('/') {
        return Err(CliError::validation(
            "paste id must be a bare identifier such as Ab12Cd34",
        ));
    }
    if TargetId::parse(&args.role_id).is_none() {
        return Err(CliError::validation("role id must be a 17-19 digit snowflake"));
    }
    if TargetId::parse(&args.guild).is_none() {
        return Err(CliError::validation("guild id must be a 17-19 digit snowflake"));
    }
    Ok(args)
}

fn spawn_printer(mut stream: EventStream, run_id: Uuid, format: OutputFormat) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(envelope) = stream.next().await {
            if envelope.event.run_id() != run_id {
                continue;
            }
            match event_line(&envelope, format) {
                Ok(Some(line)) => println!("{line}"),
                Ok(None) => {}
                Err(err) => eprintln!("warning: {}", err.display_message()),
            }
            if envelope.event.is_terminal() {
                break;
            }
        }
    })
}

async fn drain(mut printer: JoinHandle<()>) {
    if timeout(EVENT_DRAIN_GRACE, &mut printer).await.is_err() {
        printer.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(paste_id: &str, role_id: &str, guild: &str) -> AssignArgs {
        AssignArgs {
            paste_id: paste_id.to_string(),
            role_id: role_id.to_string(),
            guild: guild.to_string(),
            dry_run: false,
            actor: None,
            actor_roles: Vec::new(),
            metrics: false,
        }
    }

    #[test]
    fn arguments_must_look_like_ids() {
        assert!(checked_arguments(args("Ab12Cd34", "735479013522276412", "1448975847657836668")).is_ok());
        for bad in [
            args("", "735479013522276412", "1448975847657836668"),
            args("raw/Ab12Cd34", "735479013522276412", "1448975847657836668"),
            args("Ab12Cd34", "moderators", "1448975847657836668"),
            args("Ab12Cd34", "735479013522276412", "42"),
        ] {
            let err = checked_arguments(bad).expect_err("invalid arguments");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn identifiers_are_trimmed_before_use() {
        let checked = checked_arguments(args(
            " Ab12Cd34 ",
            "735479013522276412\t",
            " 1448975847657836668",
        ))
        .expect("padded ids are valid");
        assert_eq!(checked.paste_id, "Ab12Cd34");
        assert_eq!(checked.role_id, "735479013522276412");
        assert_eq!(checked.guild, "1448975847657836668");
    }
}
