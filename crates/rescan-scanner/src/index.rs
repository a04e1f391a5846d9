//! How a library's files are listed from the media index.
//!
//! Movie-like libraries expose files directly on their items. TV libraries
//! expose shows, and the files hang off each show's episodes, which costs
//! one extra request per show.

use rescan_core::{IndexError, LibraryDescriptor, LibraryKind, MediaIndex};
use tracing::debug;

/// Listing strategy for a library section.
///
/// # Examples
///
/// ```
/// use rescan_core::LibraryKind;
/// use rescan_scanner::LibraryLayout;
///
/// assert_eq!(LibraryLayout::for_kind(&LibraryKind::Show), LibraryLayout::Episodic);
/// assert_eq!(LibraryLayout::for_kind(&LibraryKind::Movie), LibraryLayout::Flat);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryLayout {
    /// Items carry their own media parts.
    Flat,
    /// Items are shows; files live on their episodes.
    Episodic,
}

impl LibraryLayout {
    /// Picks the layout for a section type.
    #[inline]
    #[must_use]
    pub const fn for_kind(kind: &LibraryKind) -> Self {
        if kind.is_episodic() {
            Self::Episodic
        } else {
            Self::Flat
        }
    }

    /// Lists every file path the index knows for `library`.
    ///
    /// Paths are returned exactly as the index reports them.
    ///
    /// # Errors
    ///
    /// Returns the first index error. Nothing is returned for a library whose
    /// listing failed halfway.
    pub fn list_file_paths<I: MediaIndex + ?Sized>(
        self,
        index: &I,
        library: &LibraryDescriptor,
    ) -> Result<Vec<String>, IndexError> {
        let items = index.items(&library.id)?;
        let mut paths = Vec::new();

        match self {
            Self::Flat => {
                for item in &items {
                    paths.extend(item.file_paths().map(str::to_owned));
                }
            }
            Self::Episodic => {
                for show in &items {
                    let episodes = index.episodes(show)?;
                    debug!(show = %show.title, episodes = episodes.len(), "Listed episodes");
                    for episode in &episodes {
                        paths.extend(episode.file_paths().map(str::to_owned));
                    }
                }
            }
        }

        Ok(paths)
    }
}
