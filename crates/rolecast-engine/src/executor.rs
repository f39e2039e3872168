//! Applies one role grant and confirms it with a fresh member read.
//!
//! # Design
//! - No retries here; a rate-limit rejection is handed back to the scheduler untouched.
//! - The verification read is authoritative over the grant response.

use std::sync::Arc;
use std::time::Duration;

use rolecast_core::{ApiError, GuildApi, MutationOutcome, MutationRequest, ReasonCode, TargetId};
use thiserror::Error;
use tracing::debug;

/// The remote API rejected a call with a rate-limit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limited by remote api")]
pub struct RateLimited {
    /// Server-provided wait hint, when present.
    pub retry_after: Option<Duration>,
}

/// Grants a role to one member and reads the member back.
pub struct MutationExecutor<A: ?Sized> {
    api: Arc<A>,
}

impl<A: ?Sized> Clone for MutationExecutor<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A> MutationExecutor<A>
where
    A: GuildApi + ?Sized,
{
    /// Wrap a guild API client.
    #[must_use]
    pub const fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Apply `request`; in dry-run mode only the member read is performed.
    ///
    /// # Errors
    ///
    /// Returns [`RateLimited`] when either call is rejected with a rate-limit status.
    pub async fn apply(
        &self,
        request: &MutationRequest,
        dry_run: bool,
    ) -> Result<MutationOutcome, RateLimited> {
        let guild_id = request.container_id();
        let target = request.target_id();
        let role_id = request.capability_id();

        if dry_run {
            return match self.api.member(guild_id, target.as_str()).await {
                Ok(_) => Ok(success(target)),
                Err(err) => classify(target, err),
            };
        }

        if let Err(err) = self
            .api
            .grant_role(guild_id, target.as_str(), role_id)
            .await
        {
            return classify(target, err);
        }

        match self.api.member(guild_id, target.as_str()).await {
            Ok(member) if member.has_role(role_id) => {
                debug!(target_id = %target, "grant verified");
                Ok(success(target))
            }
            Ok(_) => Ok(MutationOutcome::failure(
                target.clone(),
                ReasonCode::VerificationFailed,
                "role missing after grant",
            )),
            Err(err) => classify(target, err),
        }
    }
}

fn success(target: &TargetId) -> MutationOutcome {
    MutationOutcome::Success {
        target_id: target.clone(),
    }
}

fn classify(target: &TargetId, err: ApiError) -> Result<MutationOutcome, RateLimited> {
    match err {
        ApiError::RateLimited { retry_after, .. } => Err(RateLimited { retry_after }),
        err @ ApiError::NotFound { .. } => Ok(MutationOutcome::failure(
            target.clone(),
            ReasonCode::NotFound,
            err.detail(),
        )),
        other => Ok(MutationOutcome::failure(
            target.clone(),
            ReasonCode::TransportError,
            other.detail(),
        )),
    }
}
