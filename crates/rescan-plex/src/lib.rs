//! Plex Media Server client.
//!
//! This crate provides [`PlexClient`], a small blocking client for the parts
//! of the Plex HTTP API the scanner needs, and implements
//! [`MediaIndex`](rescan_core::MediaIndex) on top of it:
//!
//! | Call | Endpoint |
//! |------|----------|
//! | [`identity`](PlexClient::identity) | `GET /identity` |
//! | [`sections`](rescan_core::MediaIndex::sections) | `GET /library/sections` |
//! | [`items`](rescan_core::MediaIndex::items) | `GET /library/sections/{id}/all` |
//! | [`episodes`](rescan_core::MediaIndex::episodes) | `GET /library/metadata/{ratingKey}/allLeaves` |
//! | [`refresh`](rescan_core::MediaIndex::refresh) | `GET /library/sections/{id}/refresh?path=...` |
//!
//! Every request sends the token in the `X-Plex-Token` header and asks for
//! JSON.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod api;
mod client;
mod error;

pub use api::ServerIdentity;
pub use client::PlexClient;
pub use error::PlexError;
