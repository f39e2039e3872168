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

//! HTTP adapters behind the `GuildApi` and `TargetSource` seams.
//!
//! Layout: `discord.rs` (role grant and member read against the Discord REST API),
//! `paste.rs` (raw paste fetcher), `error.rs` (construction errors), `endpoint.rs`
//! (URL building shared by both clients).

mod endpoint;
pub mod discord;
pub mod error;
pub mod paste;

pub use discord::DiscordClient;
pub use error::{HttpSetupError, HttpSetupResult};
pub use paste::PasteClient;
