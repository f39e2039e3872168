//! Batch orchestrator: fetch targets, schedule grants, summarize.
//!
//! # Design
//! - Each instance drives exactly one run through `Idle -> Fetching -> Running ->
//!   Summarizing -> Done`, or `Fetching -> Failed` when the source cannot be read.
//! - Lifecycle events go through the shared bus; publishing never blocks the scheduler.
//! - Live runs hold the guild's ledger lock for their whole duration; a lock held elsewhere
//!   is `RunError::Busy`.
//! - Ledger failures are logged and the run carries on.

use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use rolecast_core::{
    GuildApi, MutationOutcome, MutationRequest, RunSummary, SummaryBuilder, TargetSource,
};
use rolecast_events::{Event, EventBus};
use rolecast_telemetry::{Metrics, run_span};
use tracing::{Instrument, debug, info, warn};
use uuid::Uuid;

use crate::error::{RunError, RunResult};
use crate::ledger::{LedgerLock, RunLedger};
use crate::registry::RunRegistry;
use crate::scheduler::{OutcomeSink, Scheduler};
use crate::settings::RunSettings;

/// Parameters for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunRequest {
    /// Paste identifier listing the targets.
    pub source_id: String,
    /// Role to grant.
    pub capability_id: String,
    /// Guild the targets belong to.
    pub container_id: String,
    /// Read members without granting or touching the ledger.
    pub dry_run: bool,
    /// Outcome of the caller's access check.
    pub authorized: bool,
}

/// Lifecycle state of an orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Not started.
    Idle,
    /// Downloading and parsing the target list.
    Fetching,
    /// Granting roles.
    Running,
    /// Building the summary.
    Summarizing,
    /// Finished with a summary.
    Done,
    /// Aborted before any mutation.
    Failed,
}

/// Runs one batch of role grants end to end.
pub struct BatchOrchestrator<S: ?Sized, A: ?Sized> {
    run_id: Uuid,
    source: Arc<S>,
    scheduler: Scheduler<A>,
    events: EventBus,
    metrics: Metrics,
    registry: RunRegistry,
    settings: RunSettings,
    phase: Mutex<RunPhase>,
}

impl<S, A> BatchOrchestrator<S, A>
where
    S: TargetSource + ?Sized,
    A: GuildApi + ?Sized,
{
    /// Wire an orchestrator to its collaborators.
    #[must_use]
    pub fn new(
        source: Arc<S>,
        api: Arc<A>,
        events: EventBus,
        metrics: Metrics,
        registry: RunRegistry,
        settings: RunSettings,
    ) -> Self {
        let scheduler = Scheduler::new(api, settings.pacing, metrics.clone());
        Self {
            run_id: Uuid::new_v4(),
            source,
            scheduler,
            events,
            metrics,
            registry,
            settings,
            phase: Mutex::new(RunPhase::Idle),
        }
    }

    /// Identifier carried by every event this orchestrator publishes.
    #[must_use]
    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    /// Current lifecycle phase.
    #[must_use]
    pub fn phase(&self) -> RunPhase {
        *self.phase.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Execute the run described by `request`.
    ///
    /// # Errors
    ///
    /// Returns an error when the orchestrator was already used, the caller is not authorized,
    /// another run holds the guild, or the target list cannot be fetched. Per-target failures
    /// are reported inside the summary instead.
    pub async fn run(&self, request: RunRequest) -> RunResult<RunSummary> {
        self.claim()?;
        if !request.authorized {
            self.set_phase(RunPhase::Failed);
            return Err(RunError::Unauthorized {
                guild_id: request.container_id,
            });
        }
        let Some(permit) = self.registry.try_acquire(&request.container_id) else {
            self.set_phase(RunPhase::Failed);
            return Err(RunError::Busy {
                guild_id: request.container_id,
            });
        };
        let _ledger_lock = if request.dry_run {
            None
        } else {
            match LedgerLock::try_acquire(&self.settings.ledger_dir, &request.container_id).await
            {
                Ok(Some(lock)) => {
                    debug!(
                        guild_id = permit.guild_id(),
                        lock = %lock.path().display(),
                        "ledger locked"
                    );
                    Some(lock)
                }
                Ok(None) => {
                    self.set_phase(RunPhase::Failed);
                    return Err(RunError::Busy {
                        guild_id: request.container_id,
                    });
                }
                Err(err) => {
                    warn!(error = %err, "failed to lock ledger");
                    None
                }
            }
        };

        let span = run_span(
            self.run_id,
            &request.container_id,
            &request.capability_id,
            request.dry_run,
        );
        self.drive(request).instrument(span).await
    }

    fn claim(&self) -> RunResult<()> {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        if *phase != RunPhase::Idle {
            return Err(RunError::AlreadyStarted);
        }
        *phase = RunPhase::Fetching;
        Ok(())
    }

    fn set_phase(&self, next: RunPhase) {
        let mut phase = self.phase.lock().unwrap_or_else(PoisonError::into_inner);
        debug!(from = ?*phase, to = ?next, "run phase changed");
        *phase = next;
    }

    async fn drive(&self, request: RunRequest) -> RunResult<RunSummary> {
        let targets = match self.source.fetch(&request.source_id).await {
            Ok(targets) => targets,
            Err(source) => {
                warn!(source_id = %request.source_id, error = %source, "target fetch failed");
                self.set_phase(RunPhase::Failed);
                self.metrics.inc_run("failed");
                self.events.publish(Event::RunFailed {
                    run_id: self.run_id,
                    message: source.to_string(),
                });
                return Err(RunError::Fetch {
                    source_id: request.source_id,
                    source,
                });
            }
        };

        let requests: Vec<MutationRequest> = targets
            .into_iter()
            .map(|target| {
                MutationRequest::new(
                    request.container_id.as_str(),
                    target,
                    request.capability_id.as_str(),
                )
            })
            .collect();
        let total = requests.len();

        self.set_phase(RunPhase::Running);
        info!(total, "starting run");
        self.events.publish(Event::RunStarted {
            run_id: self.run_id,
            guild_id: request.container_id.clone(),
            capability_id: request.capability_id.clone(),
            total,
            dry_run: request.dry_run,
        });
        self.metrics.set_targets_pending(total);

        let ledger = if request.dry_run {
            None
        } else {
            let mut ledger = RunLedger::new(&self.settings.ledger_dir, &request.container_id);
            if let Err(err) = ledger.reset().await {
                warn!(error = %err, path = %ledger.path().display(), "failed to reset ledger");
            }
            Some(ledger)
        };

        let mut accumulator = RunAccumulator {
            run_id: self.run_id,
            total,
            progress_every: self.settings.progress_every.max(1),
            summary: SummaryBuilder::new(request.capability_id.as_str(), request.dry_run),
            ledger,
            events: &self.events,
            metrics: &self.metrics,
        };
        self.scheduler
            .run(&requests, request.dry_run, &mut accumulator)
            .await;

        self.set_phase(RunPhase::Summarizing);
        let summary = accumulator.summary.finish();
        self.events.publish(Event::RunCompleted {
            run_id: self.run_id,
            success: summary.success_count,
            failed: summary.fail_count,
        });
        self.metrics.inc_run("done");
        self.metrics.set_targets_pending(0);
        info!(
            success = summary.success_count,
            failed = summary.fail_count,
            "run finished"
        );
        self.set_phase(RunPhase::Done);
        Ok(summary)
    }
}

struct RunAccumulator<'a> {
    run_id: Uuid,
    total: usize,
    progress_every: usize,
    summary: SummaryBuilder,
    ledger: Option<RunLedger>,
    events: &'a EventBus,
    metrics: &'a Metrics,
}

#[async_trait]
impl OutcomeSink for RunAccumulator<'_> {
    async fn accept(&mut self, index: usize, outcome: MutationOutcome) {
        if let (MutationOutcome::Success { target_id }, Some(ledger)) =
            (&outcome, self.ledger.as_mut())
            && let Err(err) = ledger.record_success(target_id).await
        {
            warn!(target_id = %target_id, error = %err, "failed to append to ledger");
        }
        self.summary.record(&outcome);

        let processed = index + 1;
        self.metrics
            .set_targets_pending(self.total.saturating_sub(processed));
        if processed % self.progress_every == 0 {
            self.events.publish(Event::Progress {
                run_id: self.run_id,
                processed,
                total: self.total,
                success: self.summary.success_count(),
                failed: self.summary.fail_count(),
            });
        }
    }
}
