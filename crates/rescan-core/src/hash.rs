//! Fx-hashed collection aliases.
//!
//! Every hot lookup in a scan run is keyed by a path string: cache
//! membership, folder deduplication and per-library grouping. The Fx hash
//! from `rustc-hash` is noticeably faster than SipHash for those keys and the
//! inputs are local filesystem paths, so hash flooding is not a concern.
//!
//! # Examples
//!
//! ```
//! use rescan_core::{PathSet, path_set_with_capacity};
//!
//! let mut known: PathSet = path_set_with_capacity(2);
//! known.insert("/media/movies/a.mkv".to_owned());
//! assert!(known.contains("/media/movies/a.mkv"));
//! ```

/// A [`HashMap`](std::collections::HashMap) using the Fx hash algorithm.
pub type FxHashMap<K, V> = rustc_hash::FxHashMap<K, V>;

/// A [`HashSet`](std::collections::HashSet) using the Fx hash algorithm.
pub type FxHashSet<V> = rustc_hash::FxHashSet<V>;

/// A set of file paths in the exact string form reported by the media index.
pub type PathSet = FxHashSet<String>;

/// Creates an empty [`PathSet`] able to hold `capacity` paths without
/// reallocating.
///
/// Library listings report their size up front, so the cache pre-sizes each
/// set before filling it.
#[inline]
#[must_use]
pub fn path_set_with_capacity(capacity: usize) -> PathSet {
    PathSet::with_capacity_and_hasher(capacity, rustc_hash::FxBuildHasher)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_set_exact_membership() {
        let mut set = path_set_with_capacity(4);
        set.insert("/media/movies/a.mkv".to_owned());

        assert!(set.contains("/media/movies/a.mkv"));
        assert!(!set.contains("/media/movies/A.mkv"));
        assert!(!set.contains("/media/movies//a.mkv"));
    }

    #[test]
    fn test_path_set_with_capacity() {
        let set = path_set_with_capacity(100);
        assert!(set.capacity() >= 100);
        assert!(set.is_empty());
    }
}
