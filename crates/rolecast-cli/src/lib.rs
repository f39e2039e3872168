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
#![allow(clippy::redundant_pub_crate)]

//! Command-line trigger for Rolecast runs.
//!
//! Layout:
//! - `cli.rs`: argument parsing and command dispatch
//! - `commands/`: command handlers (`assign`, `ledger`)
//! - `client.rs`: CLI errors, exit codes, and shared context
//! - `access.rs`: actor allow-list gate
//! - `output.rs`: renderers for events, summaries, and ledgers
//! - `main.rs`: thin entrypoint delegating to `run()`

pub(crate) mod access;
pub(crate) mod cli;
pub(crate) mod client;
pub(crate) mod commands;
pub(crate) mod output;

pub use cli::{run, run_from};
