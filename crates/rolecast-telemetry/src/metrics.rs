//! Prometheus-backed metrics registry and snapshot helpers.
//!
//! # Design
//! - Encapsulates collector registration to keep the public API small.
//! - Exposes only the counters a bulk run reports on: outcomes, retries, runs, backlog.

use std::sync::Arc;

use prometheus::{IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use serde::Serialize;

use crate::error::{Result, TelemetryError};

const MUTATIONS_TOTAL: &str = "rolecast_mutations_total";
const RATE_LIMIT_RETRIES_TOTAL: &str = "rolecast_rate_limit_retries_total";
const RUNS_TOTAL: &str = "rolecast_runs_total";
const TARGETS_PENDING: &str = "rolecast_targets_pending";

/// Prometheus-backed metrics registry shared across a process.
#[derive(Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

struct MetricsInner {
    registry: Registry,
    mutations_total: IntCounterVec,
    rate_limit_retries_total: IntCounter,
    runs_total: IntCounterVec,
    targets_pending: IntGauge,
}

/// Snapshot of selected gauges and counters.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    /// Total rate-limit retries performed.
    pub rate_limit_retries_total: u64,
    /// Targets still waiting in the active run.
    pub targets_pending: i64,
}

impl Metrics {
    /// Construct a new metrics registry with the standard collectors registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the Prometheus collectors cannot be built or registered.
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let mutations_total = IntCounterVec::new(
            Opts::new(MUTATIONS_TOTAL, "Role grant outcomes by result label"),
            &["outcome"],
        )
        .map_err(|source| TelemetryError::metric("build", MUTATIONS_TOTAL, source))?;
        let rate_limit_retries_total = IntCounter::with_opts(Opts::new(
            RATE_LIMIT_RETRIES_TOTAL,
            "Requests retried after a rate-limit rejection",
        ))
        .map_err(|source| TelemetryError::metric("build", RATE_LIMIT_RETRIES_TOTAL, source))?;
        let runs_total = IntCounterVec::new(
            Opts::new(RUNS_TOTAL, "Bulk runs by terminal state"),
            &["result"],
        )
        .map_err(|source| TelemetryError::metric("build", RUNS_TOTAL, source))?;
        let targets_pending = IntGauge::with_opts(Opts::new(
            TARGETS_PENDING,
            "Targets not yet processed in the active run",
        ))
        .map_err(|source| TelemetryError::metric("build", TARGETS_PENDING, source))?;

        register(&registry, MUTATIONS_TOTAL, &mutations_total)?;
        register(&registry, RATE_LIMIT_RETRIES_TOTAL, &rate_limit_retries_total)?;
        register(&registry, RUNS_TOTAL, &runs_total)?;
        register(&registry, TARGETS_PENDING, &targets_pending)?;

        Ok(Self {
            inner: Arc::new(MetricsInner {
                registry,
                mutations_total,
                rate_limit_retries_total,
                runs_total,
                targets_pending,
            }),
        })
    }

    /// Count one mutation outcome (`success` or a failure reason label).
    pub fn inc_mutation(&self, outcome: &str) {
        self.inner
            .mutations_total
            .with_label_values(&[outcome])
            .inc();
    }

    /// Count one rate-limit retry.
    pub fn inc_rate_limit_retry(&self) {
        self.inner.rate_limit_retries_total.inc();
    }

    /// Count one run reaching a terminal state (`done` or `failed`).
    pub fn inc_run(&self, result: &str) {
        self.inner.runs_total.with_label_values(&[result]).inc();
    }

    /// Set the pending-target gauge.
    pub fn set_targets_pending(&self, pending: usize) {
        self.inner
            .targets_pending
            .set(i64::try_from(pending).unwrap_or(i64::MAX));
    }

    /// Current count for one mutation outcome label.
    #[must_use]
    pub fn mutation_count(&self, outcome: &str) -> u64 {
        self.inner
            .mutations_total
            .with_label_values(&[outcome])
            .get()
    }

    /// Render the registry using the Prometheus text exposition format.
    ///
    /// # Errors
    ///
    /// Returns an error if a metric family cannot be encoded.
    pub fn render(&self) -> Result<String> {
        TextEncoder::new()
            .encode_to_string(&self.inner.registry.gather())
            .map_err(|source| TelemetryError::Render { source })
    }

    /// Take a point-in-time snapshot of the scalar collectors.
    #[must_use]
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            rate_limit_retries_total: self.inner.rate_limit_retries_total.get(),
            targets_pending: self.inner.targets_pending.get(),
        }
    }
}

fn register<C>(registry: &Registry, name: &'static str, collector: &C) -> Result<()>
where
    C: prometheus::core::Collector + Clone + 'static,
{
    registry
        .register(Box::new(collector.clone()))
        .map_err(|source| TelemetryError::metric("register", name, source))
}
