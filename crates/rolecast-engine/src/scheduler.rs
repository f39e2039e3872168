//! Sequential scheduler with a single bounded rate-limit retry.
//!
//! # Design
//! - One request at a time, outcomes delivered in request order.
//! - The sink is awaited before the next request starts, so a ledger write always lands
//!   before the following grant.
//! - Only rate-limit rejections are retried, and only once.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use rolecast_core::{GuildApi, MutationOutcome, MutationRequest, ReasonCode};
use rolecast_telemetry::Metrics;
use tokio::time::sleep;
use tracing::{info, warn};

use crate::executor::MutationExecutor;
use crate::settings::PacingPolicy;

/// Receives outcomes as the scheduler produces them.
#[async_trait]
pub trait OutcomeSink: Send {
    /// Accept the outcome for the request at `index`.
    async fn accept(&mut self, index: usize, outcome: MutationOutcome);
}

#[async_trait]
impl OutcomeSink for Vec<MutationOutcome> {
    async fn accept(&mut self, _index: usize, outcome: MutationOutcome) {
        self.push(outcome);
    }
}

/// Drives a [`MutationExecutor`] over a batch of requests.
pub struct Scheduler<A: ?Sized> {
    executor: MutationExecutor<A>,
    pacing: PacingPolicy,
    metrics: Metrics,
}

impl<A> Scheduler<A>
where
    A: GuildApi + ?Sized,
{
    /// Build a scheduler around `api`.
    #[must_use]
    pub const fn new(api: Arc<A>, pacing: PacingPolicy, metrics: Metrics) -> Self {
        Self {
            executor: MutationExecutor::new(api),
            pacing,
            metrics,
        }
    }

    /// Process `requests` in order, handing each outcome to `sink`.
    pub async fn run<K>(&self, requests: &[MutationRequest], dry_run: bool, sink: &mut K)
    where
        K: OutcomeSink + ?Sized,
    {
        for (index, request) in requests.iter().enumerate() {
            if index > 0 {
                pause(self.pacing.inter_request_delay).await;
            }
            let outcome = self.execute(request, dry_run).await;
            sink.accept(index, outcome).await;
        }
    }

    /// Process `requests` and collect the outcomes.
    pub async fn collect(
        &self,
        requests: &[MutationRequest],
        dry_run: bool,
    ) -> Vec<MutationOutcome> {
        let mut outcomes = Vec::with_capacity(requests.len());
        self.run(requests, dry_run, &mut outcomes).await;
        outcomes
    }

    /// Execute one request, retrying once after a rate-limit rejection.
    pub async fn execute(&self, request: &MutationRequest, dry_run: bool) -> MutationOutcome {
        let outcome = match self.executor.apply(request, dry_run).await {
            Ok(outcome) => outcome,
            Err(limited) => {
                let wait = self.pacing.cooldown_for(limited.retry_after);
                info!(
                    target_id = %request.target_id(),
                    wait_ms = u64::try_from(wait.as_millis()).unwrap_or(u64::MAX),
                    hinted = limited.retry_after.is_some(),
                    "rate limited; cooling down before retry"
                );
                self.metrics.inc_rate_limit_retry();
                pause(wait).await;
                self.executor
                    .apply(request, dry_run)
                    .await
                    .unwrap_or_else(|_| {
                        MutationOutcome::failure(
                            request.target_id().clone(),
                            ReasonCode::RateLimited,
                            "still rate limited after retry",
                        )
                    })
            }
        };

        match &outcome {
            MutationOutcome::Success { .. } => self.metrics.inc_mutation("success"),
            MutationOutcome::Failure {
                target_id,
                reason,
                message,
            } => {
                warn!(target_id = %target_id, reason = %reason, message = %message, "mutation failed");
                self.metrics.inc_mutation(reason.as_str());
            }
        }
        outcome
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
