//! Error types for the rescan-scanner crate.
//!
//! This module provides [`ScanError`]. A scan run never fails as a whole:
//! every error is turned into a message in the run statistics. The variants
//! only differ in how far they reach.
//!
//! # Error Recovery Strategy
//!
//! - **Index errors** ([`ScanError::Index`]) while listing sections, and
//!   [`ScanError::MissingLibraryTypes`]: the run is aborted, the summary is
//!   still reported
//! - **Missing roots** ([`ScanError::RootNotFound`]): recorded, the root is
//!   skipped and the next root is walked
//! - **Walk errors** ([`ScanError::Walk`]) and [`ScanError::NonUtf8Path`]:
//!   recorded as warnings, the entry is skipped

use camino::Utf8PathBuf;
use rescan_core::IndexError;

/// Errors that can occur during a scan run.
///
/// # Examples
///
/// ```
/// use rescan_scanner::ScanError;
///
/// let err = ScanError::MissingLibraryTypes(vec!["show".to_owned()]);
/// assert!(err.aborts_run());
/// assert!(err.to_string().contains("show"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The media index failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// One or more required library types are absent from the index.
    #[error("required library types not found in the index: {}", .0.join(", "))]
    MissingLibraryTypes(Vec<String>),

    /// A configured scan root does not exist or is not a directory.
    #[error("scan directory not found: {0}")]
    RootNotFound(Utf8PathBuf),

    /// Failed to read a directory entry.
    #[error("failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),

    /// A path is not valid UTF-8.
    #[error("path is not valid UTF-8: {}", _0.display())]
    NonUtf8Path(std::path::PathBuf),
}

impl ScanError {
    /// Returns `true` if this error stops the run before any walking.
    #[inline]
    #[must_use]
    pub const fn aborts_run(&self) -> bool {
        matches!(self, Self::Index(_) | Self::MissingLibraryTypes(_))
    }

    /// Returns `true` if this error only costs a single entry.
    #[inline]
    #[must_use]
    pub const fn is_entry_level(&self) -> bool {
        matches!(self, Self::Walk(_) | Self::NonUtf8Path(_))
    }
}
