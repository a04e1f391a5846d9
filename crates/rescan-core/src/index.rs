//! The media index interface.
//!
//! [`MediaIndex`] is the boundary between the scan engine and the media
//! server. The engine only ever needs four calls: list sections, list the
//! items of a section, list the episodes of a show, and trigger a folder
//! refresh. The Plex HTTP client implements it; tests implement it in memory.

use camino::Utf8Path;

use crate::types::{LibraryDescriptor, LibraryId, MediaItem};

/// Errors surfaced by a [`MediaIndex`] implementation.
///
/// The scan engine never matches on the backend detail; it records the
/// message and moves on, so implementations box their own error type.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    /// The index does not know the requested library.
    #[error("unknown library section: {0}")]
    UnknownLibrary(LibraryId),

    /// The backend failed (transport, HTTP status, decoding, ...).
    #[error("{context}: {source}")]
    Backend {
        /// What the engine was asking for.
        context: String,
        /// The backend error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl IndexError {
    /// Wraps a backend error with a short description of the request.
    pub fn backend(
        context: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Backend {
            context: context.into(),
            source: source.into(),
        }
    }
}

/// Read and refresh access to the external media index.
///
/// All calls are blocking. A scan run issues them strictly sequentially from
/// a single thread.
pub trait MediaIndex {
    /// Lists every library section with its type, title and root locations.
    fn sections(&self) -> Result<Vec<LibraryDescriptor>, IndexError>;

    /// Lists the top-level items of a section (movies, or shows for TV).
    fn items(&self, library: &LibraryId) -> Result<Vec<MediaItem>, IndexError>;

    /// Lists every episode of a show item.
    fn episodes(&self, show: &MediaItem) -> Result<Vec<MediaItem>, IndexError>;

    /// Asks the index to re-scan one folder of a library.
    ///
    /// The index performs the scan asynchronously; this returns once the
    /// request was accepted.
    fn refresh(&self, library: &LibraryId, folder: &Utf8Path) -> Result<(), IndexError>;
}

impl<T: MediaIndex + ?Sized> MediaIndex for &T {
    fn sections(&self) -> Result<Vec<LibraryDescriptor>, IndexError> {
        (**self).sections()
    }

    fn items(&self, library: &LibraryId) -> Result<Vec<MediaItem>, IndexError> {
        (**self).items(library)
    }

    fn episodes(&self, show: &MediaItem) -> Result<Vec<MediaItem>, IndexError> {
        (**self).episodes(show)
    }

    fn refresh(&self, library: &LibraryId, folder: &Utf8Path) -> Result<(), IndexError> {
        (**self).refresh(library, folder)
    }
}
