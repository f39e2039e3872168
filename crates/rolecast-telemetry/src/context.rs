//! Span helpers for the application and for individual runs.
//!
//! # Design
//! - Keeps a process-wide application span entered so every log line carries the mode and
//!   build identifier.
//! - Run spans carry the run, guild, and role identifiers for every per-target log line.

use std::fmt::Display;

use tracing::{Span, span::Entered};

use crate::init::build_sha;

/// Guard that keeps the application-level span entered for the lifetime of the process.
pub struct GlobalContextGuard {
    _guard: Entered<'static>,
}

impl GlobalContextGuard {
    /// Enter the application-level tracing span for the lifetime of the guard.
    #[must_use]
    pub fn new(mode: impl Into<String>) -> Self {
        let mode = mode.into();
        let span: &'static Span = Box::leak(Box::new(
            tracing::info_span!("app", mode = %mode, build_sha = %build_sha()),
        ));
        let guard = span.enter();
        Self { _guard: guard }
    }
}

/// Build the span that wraps one orchestrator run.
#[must_use]
pub fn run_span(run_id: impl Display, guild_id: &str, capability_id: &str, dry_run: bool) -> Span {
    tracing::info_span!(
        "run",
        run_id = %run_id,
        guild_id = %guild_id,
        capability_id = %capability_id,
        dry_run = dry_run,
    )
}
