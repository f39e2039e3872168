#![forbid(unsafe_code)]
#![warn(
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Run engine for verified bulk role grants.
//!
//! Layout: `executor.rs` (one grant plus verification), `scheduler.rs` (sequential pacing and
//! the single rate-limit retry), `ledger.rs` (per-guild success log and its
//! cross-process lock), `registry.rs` (one active
//! run per guild), `orchestrator.rs` (fetch, schedule, summarize), `settings.rs`, `error.rs`.

pub mod error;
pub mod executor;
pub mod ledger;
pub mod orchestrator;
pub mod registry;
pub mod scheduler;
pub mod settings;

pub use error::{LedgerError, LedgerResult, RunError, RunResult};
pub use executor::{MutationExecutor, RateLimited};
pub use ledger::{LedgerLock, RunLedger};
pub use orchestrator::{BatchOrchestrator, RunPhase, RunRequest};
pub use registry::{RunPermit, RunRegistry};
pub use scheduler::{OutcomeSink, Scheduler};
pub use settings::{PacingPolicy, RunSettings};
