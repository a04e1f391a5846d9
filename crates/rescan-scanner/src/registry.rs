//! Library registry: which library owns a given path.
//!
//! This module provides [`LibraryRegistry`], built once per run from the
//! sections reported by the [`MediaIndex`]. It answers one question for every
//! walked file: which library section is responsible for it.
//!
//! # Resolution
//!
//! Every library location is normalized (see [`crate::path::normalize`]) and
//! the path being resolved is normalized the same way. The library whose
//! location is the longest component-wise prefix of the path wins. When two
//! libraries register the exact same location, the one listed first by the
//! index wins.
//!
//! # Examples
//!
//! ```
//! use rescan_core::{LibraryDescriptor, LibraryKind};
//! use rescan_scanner::LibraryRegistry;
//!
//! let registry = LibraryRegistry::from_libraries(vec![
//!     LibraryDescriptor::new("1", LibraryKind::Movie, "Movies").with_location("/media"),
//!     LibraryDescriptor::new("2", LibraryKind::Show, "TV").with_location("/media/tv"),
//! ]);
//!
//! let owner = registry.resolve_owner("/media/tv/Show/S01E01.mkv").unwrap();
//! assert_eq!(owner.title, "TV");
//! assert!(registry.resolve_owner("/srv/other.mkv").is_none());
//! ```

use camino::Utf8Path;
use rescan_core::{IndexError, LibraryDescriptor, LibraryId, LibraryKind, LibraryMatch, MediaIndex};
use tracing::{debug, info};

use crate::path::{is_within, normalize};

/// A normalized library location pointing back at its library.
#[derive(Debug, Clone)]
struct RootEntry {
    /// The normalized location.
    root: String,
    /// Index into [`LibraryRegistry::libraries`].
    library: usize,
}

/// Maps filesystem paths to the library section that owns them.
///
/// Immutable once built; rebuilt at the start of every run.
#[derive(Debug, Clone, Default)]
pub struct LibraryRegistry {
    /// Libraries in the order reported by the index.
    libraries: Vec<LibraryDescriptor>,
    /// Every location of every library, in construction order.
    roots: Vec<RootEntry>,
}

impl LibraryRegistry {
    /// Builds the registry from the sections reported by `index`.
    ///
    /// # Errors
    ///
    /// Returns the index error if the section listing fails. The caller
    /// aborts the run in that case.
    pub fn build<I: MediaIndex + ?Sized>(index: &I) -> Result<Self, IndexError> {
        let libraries = index.sections()?;
        let registry = Self::from_libraries(libraries);

        info!(
            libraries = registry.libraries.len(),
            locations = registry.roots.len(),
            "Library registry built"
        );

        Ok(registry)
    }

    /// Builds the registry from an already fetched list of libraries.
    #[must_use]
    pub fn from_libraries(libraries: Vec<LibraryDescriptor>) -> Self {
        let roots = libraries
            .iter()
            .enumerate()
            .flat_map(|(library, descriptor)| {
                descriptor.locations.iter().map(move |location| RootEntry {
                    root: normalize(location.as_str()),
                    library,
                })
            })
            .collect::<Vec<_>>();

        for entry in &roots {
            let descriptor = &libraries[entry.library];
            debug!(
                library = %descriptor.title,
                kind = %descriptor.kind,
                root = %entry.root,
                "Registered library location"
            );
        }

        Self { libraries, roots }
    }

    /// Finds the library owning `path`, if any.
    ///
    /// Returns `None` when no library location contains the path.
    pub fn resolve_owner(&self, path: impl AsRef<Utf8Path>) -> Option<LibraryMatch> {
        let normalized = normalize(path.as_ref().as_str());

        let mut best: Option<&RootEntry> = None;
        for entry in &self.roots {
            if !is_within(&normalized, &entry.root) {
                continue;
            }
            // Strictly longer only: the first registered location keeps ties.
            if best.is_none_or(|current| entry.root.len() > current.root.len()) {
                best = Some(entry);
            }
        }

        best.map(|entry| {
            let descriptor = &self.libraries[entry.library];
            LibraryMatch {
                id: descriptor.id.clone(),
                title: descriptor.title.clone(),
            }
        })
    }

    /// Looks up a library by identifier.
    #[must_use]
    pub fn library(&self, id: &LibraryId) -> Option<&LibraryDescriptor> {
        self.libraries.iter().find(|library| &library.id == id)
    }

    /// Returns the first library of the given kind.
    #[must_use]
    pub fn find_kind(&self, kind: &LibraryKind) -> Option<&LibraryDescriptor> {
        self.libraries.iter().find(|library| &library.kind == kind)
    }

    /// Returns the required section types that no library provides.
    ///
    /// `required` holds raw type strings such as `"movie"` or `"show"`.
    pub fn missing_kinds<'a>(&self, required: &'a [String]) -> Vec<&'a str> {
        required
            .iter()
            .map(String::as_str)
            .filter(|raw| self.find_kind(&LibraryKind::from_type(raw)).is_none())
            .collect()
    }

    /// Iterates over all libraries in index order.
    pub fn libraries(&self) -> impl Iterator<Item = &LibraryDescriptor> {
        self.libraries.iter()
    }

    /// Returns the number of libraries.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.libraries.len()
    }

    /// Returns `true` if the index reported no libraries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.libraries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> LibraryRegistry {
        LibraryRegistry::from_libraries(vec![
            LibraryDescriptor::new("1", LibraryKind::Movie, "Movies")
                .with_location("/media/movies/"),
            LibraryDescriptor::new("2", LibraryKind::Show, "TV Shows")
                .with_location("/media/tv")
                .with_location("/mnt/extra//tv"),
            LibraryDescriptor::new("3", LibraryKind::Movie, "Kids Movies")
                .with_location("/media/movies/kids"),
        ])
    }

    #[test]
    fn test_resolve_owner_basic() {
        let registry = registry();
        let owner = registry.resolve_owner("/media/movies/Heat (1995)/Heat.mkv").unwrap();
        assert_eq!(owner.id, LibraryId::new("1"));
        assert_eq!(owner.title, "Movies");
    }

    #[test]
    fn test_resolve_owner_longest_prefix_wins() {
        let registry = registry();
        let owner = registry.resolve_owner("/media/movies/kids/Up (2009)/Up.mkv").unwrap();
        assert_eq!(owner.title, "Kids Movies");
    }

    #[test]
    fn test_resolve_owner_second_location() {
        let registry = registry();
        let owner = registry.resolve_owner("/mnt/extra/tv/Show/S01E01.mkv").unwrap();
        assert_eq!(owner.title, "TV Shows");
    }

    #[test]
    fn test_resolve_owner_normalizes_query() {
        let registry = registry();
        let owner = registry.resolve_owner("/media//tv/./Show/S01E01.mkv").unwrap();
        assert_eq!(owner.title, "TV Shows");
    }

    #[test]
    fn test_resolve_owner_respects_component_boundary() {
        let registry = registry();
        assert!(registry.resolve_owner("/media/movies2/a.mkv").is_none());
        assert!(registry.resolve_owner("/srv/a.mkv").is_none());
    }

    #[test]
    fn test_resolve_owner_tie_keeps_first() {
        let registry = LibraryRegistry::from_libraries(vec![
            LibraryDescriptor::new("7", LibraryKind::Movie, "First").with_location("/media/shared"),
            LibraryDescriptor::new("8", LibraryKind::Movie, "Second")
                .with_location("/media/shared/"),
        ]);

        let owner = registry.resolve_owner("/media/shared/a.mkv").unwrap();
        assert_eq!(owner.title, "First");
    }

    #[test]
    fn test_find_kind_and_missing_kinds() {
        let registry = registry();
        assert_eq!(registry.find_kind(&LibraryKind::Show).unwrap().title, "TV Shows");

        let required = vec!["movie".to_owned(), "show".to_owned(), "artist".to_owned()];
        assert_eq!(registry.missing_kinds(&required), ["artist"]);
    }

    #[test]
    fn test_library_lookup() {
        let registry = registry();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.library(&LibraryId::new("3")).unwrap().title, "Kids Movies");
        assert!(registry.library(&LibraryId::new("42")).is_none());
    }

    #[test]
    fn test_empty_registry() {
        let registry = LibraryRegistry::default();
        assert!(registry.is_empty());
        assert!(registry.resolve_owner("/media/a.mkv").is_none());
    }
}
