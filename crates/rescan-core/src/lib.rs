//! Core types, configuration, and errors for the rescan workspace.
//!
//! This crate provides the foundations shared by the scanner, the Plex
//! client, the notifier and the CLI:
//!
//! - [`Config`] and its sections, loaded from JSON
//! - [`ConfigError`] for fatal startup problems
//! - Library and media types ([`LibraryDescriptor`], [`MediaItem`], ...)
//! - The [`MediaIndex`] trait implemented by media server clients
//! - `FxHashMap`/`FxHashSet` aliases and the [`PathSet`] used for caching

#![deny(clippy::all)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod hash;
pub mod index;
pub mod types;

pub use config::{
    BehaviourConfig, Config, DEFAULT_MEDIA_EXTENSIONS, DEFAULT_PLEX_URL, LogConfig,
    MAX_RUN_INTERVAL_HOURS, NotificationConfig, PlexConfig, ScanConfig,
};
pub use error::ConfigError;
pub use hash::{FxHashMap, FxHashSet, PathSet, path_set_with_capacity};
pub use index::{IndexError, MediaIndex};
pub use types::{
    LibraryDescriptor, LibraryId, LibraryKind, LibraryMatch, Media, MediaItem, MediaPart,
};
