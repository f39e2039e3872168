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

//! Engine-agnostic model for verified bulk role grants.
//!
//! Layout: `model.rs` (identifiers, requests, outcomes, summaries), `parse.rs`
//! (raw source text to target identifiers), `service.rs` (remote-service traits),
//! `error.rs` (fetch and API error taxonomy).

pub mod error;
pub mod model;
pub mod parse;
pub mod service;

pub use error::{ApiError, ApiResult, FetchError, FetchResult};
pub use model::{
    FailureSample, MemberSnapshot, MutationOutcome, MutationRequest, ReasonCode, RunSummary,
    SUMMARY_SAMPLE_LIMIT, SummaryBuilder, TargetId,
};
pub use parse::parse_targets;
pub use service::{GuildApi, TargetSource};
