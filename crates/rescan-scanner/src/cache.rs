//! Per-run cache of the file paths each library already knows.
//!
//! This module provides [`LibraryFileCache`]. A library's listing is
//! fetched lazily, the first time a walked file resolves to it, and at most
//! once per run. Every later membership test is a hash lookup.
//!
//! # Failure handling
//!
//! If a listing fails, nothing is stored for that library, the failure is
//! recorded in the run statistics once, and every membership test against it
//! answers "not known" until the cache is cleared. A failed library is not
//! fetched again in the same run.
//!
//! # Examples
//!
//! ```
//! use rescan_core::LibraryId;
//! use rescan_scanner::LibraryFileCache;
//!
//! let cache = LibraryFileCache::new();
//! assert!(!cache.is_cached(&LibraryId::new("1")));
//! assert!(!cache.contains(&LibraryId::new("1"), "/media/movies/a.mkv"));
//! ```

use std::time::Instant;

use rescan_core::{
    FxHashMap, FxHashSet, LibraryDescriptor, LibraryId, MediaIndex, PathSet,
    path_set_with_capacity,
};
use tracing::{error, info};

use crate::index::LibraryLayout;
use crate::stats::RunStats;

/// Lazily filled map from library to the set of file paths it indexes.
///
/// Paths are stored exactly as the index reports them and compared by exact
/// string equality.
#[derive(Debug, Default)]
pub struct LibraryFileCache {
    /// Known file paths per library.
    files: FxHashMap<LibraryId, PathSet>,
    /// Libraries whose listing failed this run.
    failed: FxHashSet<LibraryId>,
}

impl LibraryFileCache {
    /// Creates an empty cache.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes sure the listing of `library` is cached.
    ///
    /// Returns `true` if the library's paths are available afterwards.
    /// Calling this again for a cached or failed library does nothing.
    pub fn ensure_cached<I: MediaIndex + ?Sized>(
        &mut self,
        library: &LibraryDescriptor,
        index: &I,
        stats: &mut RunStats,
    ) -> bool {
        if self.files.contains_key(&library.id) {
            return true;
        }
        if self.failed.contains(&library.id) {
            return false;
        }

        info!(library = %library.title, kind = %library.kind, "Initializing cache for library");
        let start = Instant::now();

        let layout = LibraryLayout::for_kind(&library.kind);
        match layout.list_file_paths(index, library) {
            Ok(paths) => {
                let mut set = path_set_with_capacity(paths.len());
                set.extend(paths);

                info!(
                    library = %library.title,
                    files = set.len(),
                    elapsed_ms = start.elapsed().as_millis(),
                    "Library cache initialized"
                );

                self.files.insert(library.id.clone(), set);
                true
            }
            Err(err) => {
                error!(library = %library.title, error = %err, "Failed to cache library files");
                stats.add_error(format!("Error caching {} library: {err}", library.title));
                self.failed.insert(library.id.clone());
                false
            }
        }
    }

    /// Returns `true` if `path` is a known file of `library`.
    ///
    /// Returns `false` for libraries that are not cached.
    #[must_use]
    pub fn contains(&self, library: &LibraryId, path: &str) -> bool {
        self.files
            .get(library)
            .is_some_and(|paths| paths.contains(path))
    }

    /// Returns `true` if the listing of `library` is cached.
    #[inline]
    #[must_use]
    pub fn is_cached(&self, library: &LibraryId) -> bool {
        self.files.contains_key(library)
    }

    /// Returns `true` if the listing of `library` failed this run.
    #[inline]
    #[must_use]
    pub fn has_failed(&self, library: &LibraryId) -> bool {
        self.failed.contains(library)
    }

    /// Number of cached paths for `library` (zero if not cached).
    #[must_use]
    pub fn len(&self, library: &LibraryId) -> usize {
        self.files.get(library).map_or(0, PathSet::len)
    }

    /// Number of libraries cached so far.
    #[inline]
    #[must_use]
    pub fn library_count(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if no library is cached.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Drops every cached listing and forgets failed ones.
    pub fn clear(&mut self) {
        self.files.clear();
        self.failed.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use camino::Utf8Path;
    use rescan_core::{IndexError, LibraryKind, Media, MediaItem, MediaPart};

    use super::*;

    fn item(key: &str, files: &[&str]) -> MediaItem {
        MediaItem {
            rating_key: key.to_owned(),
            title: key.to_owned(),
            media: vec![Media {
                parts: files
                    .iter()
                    .map(|file| MediaPart {
                        file: Some((*file).to_owned()),
                    })
                    .collect(),
            }],
        }
    }

    /// One movie library and one show library with a single show.
    #[derive(Default)]
    struct StubIndex {
        item_calls: Cell<usize>,
        episode_calls: Cell<usize>,
        fail_episodes: bool,
    }

    impl MediaIndex for StubIndex {
        fn sections(&self) -> Result<Vec<LibraryDescriptor>, IndexError> {
            Ok(Vec::new())
        }

        fn items(&self, library: &LibraryId) -> Result<Vec<MediaItem>, IndexError> {
            self.item_calls.set(self.item_calls.get() + 1);
            match library.as_str() {
                "1" => Ok(vec![
                    item("m1", &["/media/movies/a.mkv"]),
                    MediaItem::default(),
                ]),
                "2" => Ok(vec![item("show", &[])]),
                _ => Err(IndexError::UnknownLibrary(library.clone())),
            }
        }

        fn episodes(&self, _show: &MediaItem) -> Result<Vec<MediaItem>, IndexError> {
            self.episode_calls.set(self.episode_calls.get() + 1);
            if self.fail_episodes {
                return Err(IndexError::backend(
                    "listing episodes",
                    std::io::Error::other("timeout"),
                ));
            }
            Ok(vec![
                item("e1", &["/media/tv/Show/S01E01.mkv"]),
                item("e2", &["/media/tv/Show/S01E02.mkv"]),
            ])
        }

        fn refresh(&self, _library: &LibraryId, _folder: &Utf8Path) -> Result<(), IndexError> {
            Ok(())
        }
    }

    fn movies() -> LibraryDescriptor {
        LibraryDescriptor::new("1", LibraryKind::Movie, "Movies")
    }

    fn shows() -> LibraryDescriptor {
        LibraryDescriptor::new("2", LibraryKind::Show, "TV Shows")
    }

    #[test]
    fn test_flat_library_cached_once() {
        let index = StubIndex::default();
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();

        assert!(cache.ensure_cached(&movies(), &index, &mut stats));
        assert!(cache.ensure_cached(&movies(), &index, &mut stats));

        assert_eq!(index.item_calls.get(), 1);
        assert!(cache.contains(&movies().id, "/media/movies/a.mkv"));
        assert!(!cache.contains(&movies().id, "/media/movies/b.mkv"));
        assert_eq!(cache.len(&movies().id), 1);
    }

    #[test]
    fn test_episodic_library_lists_episodes() {
        let index = StubIndex::default();
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();

        assert!(cache.ensure_cached(&shows(), &index, &mut stats));
        assert!(cache.contains(&shows().id, "/media/tv/Show/S01E02.mkv"));
        assert_eq!(cache.len(&shows().id), 2);
        assert_eq!(cache.library_count(), 1);
    }

    #[test]
    fn test_failed_listing_is_not_cached() {
        let index = StubIndex {
            fail_episodes: true,
            ..StubIndex::default()
        };
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();

        assert!(!cache.ensure_cached(&shows(), &index, &mut stats));
        assert!(!cache.is_cached(&shows().id));
        assert!(!cache.contains(&shows().id, "/media/tv/Show/S01E01.mkv"));

        let summary = stats.snapshot();
        assert_eq!(summary.errors.len(), 1);
        assert!(summary.errors[0].contains("TV Shows"));
    }

    #[test]
    fn test_failed_listing_not_retried() {
        let index = StubIndex {
            fail_episodes: true,
            ..StubIndex::default()
        };
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();

        for _ in 0..50 {
            assert!(!cache.ensure_cached(&shows(), &index, &mut stats));
        }

        assert_eq!(index.item_calls.get(), 1);
        assert_eq!(index.episode_calls.get(), 1);
        assert!(cache.has_failed(&shows().id));
        assert_eq!(stats.errors().len(), 1);

        cache.clear();
        assert!(!cache.has_failed(&shows().id));
        assert!(!cache.ensure_cached(&shows(), &index, &mut stats));
        assert_eq!(index.item_calls.get(), 2);
    }

    #[test]
    fn test_exact_string_match() {
        let index = StubIndex::default();
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();
        cache.ensure_cached(&movies(), &index, &mut stats);

        assert!(!cache.contains(&movies().id, "/media/movies//a.mkv"));
        assert!(!cache.contains(&movies().id, "/media/Movies/a.mkv"));
    }

    #[test]
    fn test_clear() {
        let index = StubIndex::default();
        let mut cache = LibraryFileCache::new();
        let mut stats = RunStats::new();
        cache.ensure_cached(&movies(), &index, &mut stats);
        assert!(!cache.is_empty());

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.len(&movies().id), 0);
    }
}
