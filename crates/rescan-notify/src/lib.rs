//! Run summary notifications over Discord webhooks.
//!
//! - [`build_messages`] lays a [`RunSummary`](rescan_scanner::RunSummary)
//!   out as one or more [`Embed`]s within Discord's size and field limits
//! - [`DiscordNotifier`] posts them, in order, to the configured webhook
//!
//! Packing is a pure function so it can be tested without a network.
//!
//! # Example
//!
//! ```ignore
//! use rescan_notify::DiscordNotifier;
//!
//! match DiscordNotifier::new(&config.notifications) {
//!     Ok(notifier) => notifier.notify(&summary).await,
//!     Err(err) => tracing::info!(reason = %err, "Skipping notification"),
//! }
//! ```

#![deny(clippy::all)]
#![warn(missing_docs)]

mod embed;
mod error;
mod packer;
mod webhook;

pub use embed::{
    COLOR_BLUE, COLOR_RED, Embed, EmbedField, EmbedFooter, MAX_FIELD_NAME, MAX_FIELD_VALUE,
};
pub use error::NotifyError;
pub use packer::{EmbedLimits, MIN_EMBED_SIZE, SUMMARY_TITLE, build_messages};
pub use webhook::DiscordNotifier;
