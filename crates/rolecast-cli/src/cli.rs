//! Argument parsing, configuration loading, and command dispatch.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};
use rolecast_config::{RolecastConfig, file_exists, load};
use rolecast_telemetry::{GlobalContextGuard, LogFormat, LoggingConfig, build_sha, init_logging};

use crate::client::{CliContext, CliError, CliResult};
use crate::commands::assign::handle_assign;
use crate::commands::ledger::handle_ledger_show;

const DEFAULT_CONFIG_FILE: &str = "rolecast.yaml";

/// Parses process arguments, executes the requested command, and returns the exit code.
pub async fn run() -> i32 {
    run_from(std::env::args_os()).await
}

/// Same as [`run`] with explicit arguments (the first item is the program name).
pub async fn run_from<I, T>(args: I) -> i32
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() { 2 } else { 0 };
        }
    };

    match dispatch(cli).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("error: {}", err.display_message());
            err.exit_code()
        }
    }
}

async fn dispatch(cli: Cli) -> CliResult<()> {
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(token) = cli.token {
        config.discord.token = Some(token);
    }
    install_logging(&config);
    let _context = GlobalContextGuard::new(command_label(&cli.command));

    let ctx = CliContext {
        config,
        output: cli.output,
    };
    match cli.command {
        Command::Assign(args) => handle_assign(&ctx, args).await,
        Command::Ledger(LedgerCommand::Show(args)) => handle_ledger_show(&ctx, args).await,
    }
}

fn load_config(explicit: Option<&Path>) -> CliResult<RolecastConfig> {
    let fallback = Path::new(DEFAULT_CONFIG_FILE);
    let path = explicit.or_else(|| file_exists(fallback).then_some(fallback));
    load(path).map_err(|err| {
        CliError::failure(anyhow::Error::new(err).context("failed to load configuration"))
    })
}

fn install_logging(config: &RolecastConfig) {
    let format = config
        .logging
        .format
        .as_deref()
        .map_or_else(LogFormat::infer, |value| {
            value.parse().unwrap_or_else(|never| match never {})
        });
    let logging = LoggingConfig {
        level: &config.logging.level,
        format,
        build_sha: option_env!("ROLECAST_BUILD_SHA").unwrap_or_else(build_sha),
    };
    // Embedders and tests may already own the global subscriber.
    if let Err(err) = init_logging(&logging) {
        tracing::debug!(error = %err, "logging already initialised");
    }
}

const fn command_label(command: &Command) -> &'static str {
    match command {
        Command::Assign(args) if args.dry_run => "assign_dry_run",
        Command::Assign(_) => "assign",
        Command::Ledger(_) => "ledger_show",
    }
}

#[derive(Parser)]
#[command(
    name = "rolecast",
    version,
    about = "Grant one role to every member listed in a paste, verifying each grant"
)]
pub(crate) struct Cli {
    /// YAML configuration file; `rolecast.yaml` is used when present.
    #[arg(long, global = true, env = "ROLECAST_CONFIG")]
    pub(crate) config: Option<PathBuf>,
    /// Bot token; overrides the configured one.
    #[arg(long, global = true)]
    pub(crate) token: Option<String>,
    #[arg(
        long = "output",
        alias = "format",
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Select output format for events, summaries, and ledgers"
    )]
    pub(crate) output: OutputFormat,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Grant a role to every member listed in a paste.
    Assign(AssignArgs),
    /// Inspect per-guild ledgers.
    #[command(subcommand)]
    Ledger(LedgerCommand),
}

#[derive(Args, Debug)]
pub(crate) struct AssignArgs {
    /// Paste identifier whose raw text lists member ids, one per line.
    pub(crate) paste_id: String,
    /// Role to grant.
    pub(crate) role_id: String,
    /// Guild the members belong to.
    #[arg(long, env = "ROLECAST_GUILD_ID")]
    pub(crate) guild: String,
    /// Only check that members can be read; never grant and never touch the ledger.
    #[arg(long)]
    pub(crate) dry_run: bool,
    /// User id of the person triggering the run.
    #[arg(long, env = "ROLECAST_ACTOR_ID")]
    pub(crate) actor: Option<String>,
    /// Role ids held by the actor (repeatable).
    #[arg(long = "actor-role")]
    pub(crate) actor_roles: Vec<String>,
    /// Print Prometheus metrics after the run.
    #[arg(long)]
    pub(crate) metrics: bool,
}

#[derive(Subcommand)]
pub(crate) enum LedgerCommand {
    /// Print a guild's ledger of verified grants.
    Show(LedgerShowArgs),
}

#[derive(Args)]
pub(crate) struct LedgerShowArgs {
    /// Guild whose ledger to print.
    #[arg(long, env = "ROLECAST_GUILD_ID")]
    pub(crate) guild: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}
