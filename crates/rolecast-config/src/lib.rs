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

//! File- and environment-backed configuration for Rolecast.
//!
//! Layout: `model.rs` (typed sections), `defaults.rs` (default values), `loader.rs`
//! (YAML file plus `ROLECAST_*` overrides), `validate.rs` (guard rails), `error.rs`.

pub mod defaults;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ENV_PREFIX, apply_env_overrides, file_exists, load};
pub use model::{
    AccessConfig, DiscordConfig, LedgerConfig, LoggingSettings, PacingConfig, PasteConfig,
    ProgressConfig, RolecastConfig,
};
pub use validate::{RunMode, validate};
