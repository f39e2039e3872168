//! Typed identifiers, mutation requests, outcomes, and run summaries.
//!
//! # Design
//! - `TargetId` can only be built from text that passed the identifier shape check.
//! - Outcomes are data: per-target failures never surface as errors once a run is underway.
//! - `RunSummary` is assembled once through `SummaryBuilder` and never mutated afterwards.

use std::fmt::{self, Display, Formatter};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Maximum number of failures embedded in a run summary.
pub const SUMMARY_SAMPLE_LIMIT: usize = 10;

static TARGET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // ASCII digits only; `\d` would admit other Unicode decimal digits.
    Regex::new(r"^[0-9]{17,19}$").unwrap_or_else(|err| panic!("invalid target pattern: {err}"))
});

/// Snowflake-shaped identifier of a member to mutate (17 to 19 ASCII digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TargetId(String);

impl TargetId {
    /// Validate `raw` and wrap it; returns `None` when the shape does not match.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        TARGET_PATTERN
            .is_match(raw)
            .then(|| Self(raw.to_string()))
    }

    /// Borrow the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for TargetId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// One role grant scoped to a guild and member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationRequest {
    container_id: String,
    target_id: TargetId,
    capability_id: String,
}

impl MutationRequest {
    /// Build a request for `target_id` within `container_id`.
    #[must_use]
    pub fn new(
        container_id: impl Into<String>,
        target_id: TargetId,
        capability_id: impl Into<String>,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            target_id,
            capability_id: capability_id.into(),
        }
    }

    /// Guild the grant applies to.
    #[must_use]
    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Member receiving the role.
    #[must_use]
    pub const fn target_id(&self) -> &TargetId {
        &self.target_id
    }

    /// Role being granted.
    #[must_use]
    pub fn capability_id(&self) -> &str {
        &self.capability_id
    }
}

/// Classification attached to a failed mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// The member does not exist in the guild.
    NotFound,
    /// The remote API kept rejecting the request with a rate-limit status.
    RateLimited,
    /// The grant reported success but the member does not hold the role.
    VerificationFailed,
    /// Any other transport or protocol failure.
    TransportError,
}

impl ReasonCode {
    /// Stable lowercase label used in logs, metrics, and summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::VerificationFailed => "verification_failed",
            Self::TransportError => "transport_error",
        }
    }
}

impl Display for ReasonCode {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

/// Result of applying (or dry-running) one mutation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The member was verified to hold the role (or, in dry-run mode, was fetchable).
    Success {
        /// Member that was mutated.
        target_id: TargetId,
    },
    /// The mutation could not be confirmed.
    Failure {
        /// Member that was targeted.
        target_id: TargetId,
        /// Failure classification.
        reason: ReasonCode,
        /// Human-readable detail.
        message: String,
    },
}

impl MutationOutcome {
    /// Convenience constructor for failures.
    #[must_use]
    pub fn failure(target_id: TargetId, reason: ReasonCode, message: impl Into<String>) -> Self {
        Self::Failure {
            target_id,
            reason,
            message: message.into(),
        }
    }

    /// Member the outcome refers to.
    #[must_use]
    pub const fn target_id(&self) -> &TargetId {
        match self {
            Self::Success { target_id } | Self::Failure { target_id, .. } => target_id,
        }
    }

    /// Whether the outcome is a confirmed success.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Failure classification, if any.
    #[must_use]
    pub const fn reason(&self) -> Option<ReasonCode> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { reason, .. } => Some(*reason),
        }
    }
}

/// Member state as read back from the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    /// Member identifier.
    pub member_id: String,
    /// Role identifiers currently held.
    pub roles: Vec<String>,
}

impl MemberSnapshot {
    /// Whether the member currently holds `role_id`.
    #[must_use]
    pub fn has_role(&self, role_id: &str) -> bool {
        self.roles.iter().any(|role| role == role_id)
    }
}

/// Sampled failure embedded in a run summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureSample {
    /// Member that failed.
    pub target_id: TargetId,
    /// Failure classification.
    pub reason: ReasonCode,
    /// Human-readable detail.
    pub message: String,
}

/// Final report for one completed run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Role granted during the run.
    pub capability_id: String,
    /// Whether the run was a dry run.
    pub dry_run: bool,
    /// Number of verified successes.
    pub success_count: usize,
    /// Number of failures.
    pub fail_count: usize,
    /// First failures in run order, at most [`SUMMARY_SAMPLE_LIMIT`].
    pub failures: Vec<FailureSample>,
    /// Failures not embedded in `failures`.
    pub remaining_failures: usize,
}

impl RunSummary {
    /// Total targets processed.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.success_count + self.fail_count
    }
}

impl Display for RunSummary {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        if self.dry_run {
            write!(
                formatter,
                "dry run finished: {} users reachable for role {}, {} failed",
                self.success_count, self.capability_id, self.fail_count
            )?;
        } else {
            write!(
                formatter,
                "successfully assigned role {} to {} users. failed for {} users.",
                self.capability_id, self.success_count, self.fail_count
            )?;
        }
        for sample in &self.failures {
            write!(
                formatter,
                "\n- {} [{}] {}",
                sample.target_id, sample.reason, sample.message
            )?;
        }
        if self.remaining_failures > 0 {
            write!(formatter, "\n... and {} more", self.remaining_failures)?;
        }
        Ok(())
    }
}

/// Accumulates outcomes in run order and produces a [`RunSummary`].
#[derive(Debug, Clone)]
pub struct SummaryBuilder {
    capability_id: String,
    dry_run: bool,
    success_count: usize,
    fail_count: usize,
    failures: Vec<FailureSample>,
}

impl SummaryBuilder {
    /// Start an empty summary for `capability_id`.
    #[must_use]
    pub fn new(capability_id: impl Into<String>, dry_run: bool) -> Self {
        Self {
            capability_id: capability_id.into(),
            dry_run,
            success_count: 0,
            fail_count: 0,
            failures: Vec::new(),
        }
    }

    /// Fold one outcome into the running counts.
    pub fn record(&mut self, outcome: &MutationOutcome) {
        match outcome {
            MutationOutcome::Success { .. } => self.success_count += 1,
            MutationOutcome::Failure {
                target_id,
                reason,
                message,
            } => {
                self.fail_count += 1;
                if self.failures.len() < SUMMARY_SAMPLE_LIMIT {
                    self.failures.push(FailureSample {
                        target_id: target_id.clone(),
                        reason: *reason,
                        message: message.clone(),
                    });
                }
            }
        }
    }

    /// Successes recorded so far.
    #[must_use]
    pub const fn success_count(&self) -> usize {
        self.success_count
    }

    /// Failures recorded so far.
    #[must_use]
    pub const fn fail_count(&self) -> usize {
        self.fail_count
    }

    /// Freeze the accumulated counts.
    #[must_use]
    pub fn finish(self) -> RunSummary {
        let remaining_failures = self.fail_count - self.failures.len();
        RunSummary {
            capability_id: self.capability_id,
            dry_run: self.dry_run,
            success_count: self.success_count,
            fail_count: self.fail_count,
            failures: self.failures,
            remaining_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(suffix: u32) -> TargetId {
        TargetId::parse(&format!("1000000000000{suffix:05}")).expect("valid target id")
    }

    #[test]
    fn target_id_accepts_only_snowflake_shapes() {
        assert!(TargetId::parse("12345678901234567").is_some());
        assert!(TargetId::parse("1234567890123456789").is_some());
        assert!(TargetId::parse("1234567890123456").is_none());
        assert!(TargetId::parse("12345678901234567890").is_none());
        assert!(TargetId::parse("1234567890123456a").is_none());
        assert!(TargetId::parse(" 12345678901234567").is_none());
        assert!(TargetId::parse("١٢٣٤٥٦٧٨٩٠١٢٣٤٥٦٧").is_none());
    }

    #[test]
    fn summary_caps_failure_sample_and_counts_remainder() {
        let mut builder = SummaryBuilder::new("42", false);
        for index in 0..15 {
            builder.record(&MutationOutcome::failure(
                target(index),
                ReasonCode::NotFound,
                "unknown member",
            ));
        }
        builder.record(&MutationOutcome::Success {
            target_id: target(99),
        });

        let summary = builder.finish();
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.fail_count, 15);
        assert_eq!(summary.failures.len(), SUMMARY_SAMPLE_LIMIT);
        assert_eq!(summary.failures[0].target_id, target(0));
        assert_eq!(summary.failures[9].target_id, target(9));
        assert_eq!(summary.remaining_failures, 5);
        assert!(summary.to_string().ends_with("... and 5 more"));
    }

    #[test]
    fn summary_display_omits_remainder_when_all_sampled() {
        let mut builder = SummaryBuilder::new("42", false);
        builder.record(&MutationOutcome::failure(
            target(1),
            ReasonCode::VerificationFailed,
            "role absent after grant",
        ));
        let rendered = builder.finish().to_string();
        assert!(rendered.starts_with("successfully assigned role 42 to 0 users. failed for 1 users."));
        assert!(rendered.contains("[verification_failed] role absent after grant"));
        assert!(!rendered.contains("more"));
    }

    #[test]
    fn member_snapshot_checks_roles() {
        let snapshot = MemberSnapshot {
            member_id: "12345678901234567".to_string(),
            roles: vec!["1".to_string(), "2".to_string()],
        };
        assert!(snapshot.has_role("2"));
        assert!(!snapshot.has_role("3"));
    }

    #[test]
    fn reason_codes_serialize_as_snake_case() -> anyhow::Result<()> {
        let encoded = serde_json::to_string(&ReasonCode::VerificationFailed)?;
        assert_eq!(encoded, "\"verification_failed\"");
        assert_eq!(ReasonCode::TransportError.to_string(), "transport_error");
        Ok(())
    }
}
