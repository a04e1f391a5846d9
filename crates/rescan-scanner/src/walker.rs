//! Directory traversal for media files.
//!
//! This module provides [`MediaWalker`], which uses the `ignore` crate to
//! walk a scan root, and [`MediaFilter`], which decides what counts as a
//! media file.
//!
//! # Traversal rules
//!
//! - No ignore files are honoured: every directory is entered, hidden ones
//!   included
//! - Files whose name starts with `.` are skipped
//! - Only files with a configured media extension are reported
//!   (case-insensitive)
//! - Symlinks to files are reported; symlinks to directories are not followed
//! - With symlink checking on, symlinks whose target is gone are reported
//!   separately as [`WalkEntry::BrokenSymlink`]
//! - Entries come out sorted by file name within each directory
//!
//! # Examples
//!
//! ```no_run
//! use camino::Utf8Path;
//! use rescan_scanner::{MediaFilter, MediaWalker, WalkEntry};
//!
//! let filter = MediaFilter::new(["mkv", "mp4"]);
//! let walker = MediaWalker::new(Utf8Path::new("/media/movies"), &filter)?;
//!
//! walker.walk(|entry| {
//!     if let WalkEntry::Media(path) = entry {
//!         println!("Found: {path}");
//!     }
//! });
//! # Ok::<(), rescan_scanner::ScanError>(())
//! ```

use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use ignore::WalkBuilder;
use rescan_core::FxHashSet;
use tracing::debug;

use crate::error::ScanError;

/// Decides which files are media files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFilter {
    /// Lower-case extensions without the leading dot.
    extensions: FxHashSet<String>,
    /// Report broken symlinks instead of treating them as media.
    symlink_check: bool,
}

impl MediaFilter {
    /// Creates a filter for the given extensions.
    ///
    /// Extensions may carry a leading dot and any case; blanks are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use camino::Utf8Path;
    /// use rescan_scanner::MediaFilter;
    ///
    /// let filter = MediaFilter::new([".MKV", "mp4", " "]);
    /// assert!(filter.is_media(Utf8Path::new("/m/Heat.mkv")));
    /// assert!(filter.is_media(Utf8Path::new("/m/Heat.MP4")));
    /// assert!(!filter.is_media(Utf8Path::new("/m/Heat.srt")));
    /// assert!(!filter.is_media(Utf8Path::new("/m/.Heat.mkv")));
    /// ```
    pub fn new<S: AsRef<str>>(extensions: impl IntoIterator<Item = S>) -> Self {
        let extensions = extensions
            .into_iter()
            .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
            .filter(|ext| !ext.is_empty())
            .collect();

        Self {
            extensions,
            symlink_check: false,
        }
    }

    /// Enables or disables broken-symlink detection.
    #[must_use]
    pub const fn with_symlink_check(mut self, enabled: bool) -> Self {
        self.symlink_check = enabled;
        self
    }

    /// Returns `true` if broken-symlink detection is on.
    #[inline]
    #[must_use]
    pub const fn symlink_check(&self) -> bool {
        self.symlink_check
    }

    /// Returns `true` if `path` names a visible file with a media extension.
    #[must_use]
    pub fn is_media(&self, path: &Utf8Path) -> bool {
        let Some(name) = path.file_name() else {
            return false;
        };
        if name.starts_with('.') {
            return false;
        }

        path.extension()
            .is_some_and(|ext| self.extensions.contains(&ext.to_lowercase()))
    }

    /// Number of recognised extensions.
    #[inline]
    #[must_use]
    pub fn extension_count(&self) -> usize {
        self.extensions.len()
    }
}

/// An entry reported by [`MediaWalker::walk`].
#[derive(Debug)]
pub enum WalkEntry {
    /// A media file to check against the index.
    Media(Utf8PathBuf),
    /// A media-named symlink whose target no longer exists.
    BrokenSymlink(Utf8PathBuf),
    /// An entry that could not be read; the walk continues.
    Error(ScanError),
}

/// Walks one scan root and reports media files.
#[derive(Debug)]
pub struct MediaWalker<'a> {
    /// The root directory to walk.
    root: Utf8PathBuf,
    /// The media filter.
    filter: &'a MediaFilter,
}

impl<'a> MediaWalker<'a> {
    /// Creates a walker for `root`.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::RootNotFound`] if the root doesn't exist or isn't
    /// a directory.
    pub fn new(root: &Utf8Path, filter: &'a MediaFilter) -> Result<Self, ScanError> {
        if !root.is_dir() {
            return Err(ScanError::RootNotFound(root.to_owned()));
        }

        Ok(Self {
            root: root.to_owned(),
            filter,
        })
    }

    /// Returns the root being walked.
    #[inline]
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Walks the tree once, handing every reportable entry to `visit`.
    pub fn walk(&self, mut visit: impl FnMut(WalkEntry)) {
        for result in self.build_walker() {
            let entry = match result {
                Ok(entry) => entry,
                Err(err) => {
                    visit(WalkEntry::Error(ScanError::Walk(err)));
                    continue;
                }
            };

            let Some(file_type) = entry.file_type() else {
                continue;
            };
            if file_type.is_dir() {
                continue;
            }

            let Some(path) = Utf8Path::from_path(entry.path()) else {
                visit(WalkEntry::Error(ScanError::NonUtf8Path(entry.path().to_owned())));
                continue;
            };

            if !self.filter.is_media(path) {
                continue;
            }

            if file_type.is_symlink() {
                match fs::metadata(path) {
                    // Directory symlinks are not followed and are not files.
                    Ok(target) if target.is_dir() => continue,
                    Ok(_) => {}
                    Err(_) if self.filter.symlink_check => {
                        visit(WalkEntry::BrokenSymlink(path.to_owned()));
                        continue;
                    }
                    Err(_) => {}
                }
            }

            visit(WalkEntry::Media(path.to_owned()));
        }
    }

    /// Collects every reportable entry into a vector.
    #[must_use]
    pub fn collect_entries(&self) -> Vec<WalkEntry> {
        let mut entries = Vec::new();
        self.walk(|entry| entries.push(entry));
        entries
    }

    /// Builds the underlying `ignore` walker.
    fn build_walker(&self) -> ignore::Walk {
        debug!(root = %self.root, "Building directory walker");

        WalkBuilder::new(&self.root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .build()
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn utf8_root(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).unwrap()
    }

    fn media_paths(entries: &[WalkEntry]) -> Vec<String> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                WalkEntry::Media(path) => Some(path.file_name().unwrap_or_default().to_owned()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_root_must_exist() {
        let filter = MediaFilter::new(["mkv"]);
        let result = MediaWalker::new(Utf8Path::new("/definitely/not/here"), &filter);
        assert!(matches!(result, Err(ScanError::RootNotFound(_))));
    }

    #[test]
    fn test_root_must_be_directory() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        fs::write(root.join("file.mkv"), "").unwrap();

        let filter = MediaFilter::new(["mkv"]);
        assert!(MediaWalker::new(&root.join("file.mkv"), &filter).is_err());
    }

    #[test]
    fn test_filters_hidden_and_non_media() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join("Heat (1995)")).unwrap();
        fs::write(root.join("Heat (1995)/Heat.mkv"), "").unwrap();
        fs::write(root.join("Heat (1995)/Heat.en.srt"), "").unwrap();
        fs::write(root.join("Heat (1995)/.Heat.mkv"), "").unwrap();
        fs::write(root.join("Heat (1995)/poster.jpg"), "").unwrap();
        fs::write(root.join("UPPER.MKV"), "").unwrap();

        let filter = MediaFilter::new(["mkv"]);
        let walker = MediaWalker::new(&root, &filter).unwrap();
        let entries = walker.collect_entries();

        let mut names = media_paths(&entries);
        names.sort();
        assert_eq!(names, ["Heat.mkv", "UPPER.MKV"]);
    }

    #[test]
    fn test_hidden_directories_are_traversed() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join(".hidden")).unwrap();
        fs::write(root.join(".hidden/inside.mp4"), "").unwrap();

        let filter = MediaFilter::new(["mp4"]);
        let walker = MediaWalker::new(&root, &filter).unwrap();

        assert_eq!(media_paths(&walker.collect_entries()), ["inside.mp4"]);
    }

    #[test]
    fn test_paths_are_rooted() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        fs::create_dir_all(root.join("a/b")).unwrap();
        fs::write(root.join("a/b/c.mkv"), "").unwrap();

        let filter = MediaFilter::new(["mkv"]);
        let walker = MediaWalker::new(&root, &filter).unwrap();
        let entries = walker.collect_entries();

        match entries.as_slice() {
            [WalkEntry::Media(path)] => assert_eq!(path, &root.join("a/b/c.mkv")),
            other => panic!("unexpected entries: {other:?}"),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_reported_when_checking() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::os::unix::fs::symlink(root.join("gone.mkv"), root.join("link.mkv")).unwrap();

        let filter = MediaFilter::new(["mkv"]).with_symlink_check(true);
        let walker = MediaWalker::new(&root, &filter).unwrap();
        let entries = walker.collect_entries();

        assert!(matches!(entries.as_slice(), [WalkEntry::BrokenSymlink(_)]));
    }

    #[cfg(unix)]
    #[test]
    fn test_broken_symlink_is_media_without_checking() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        std::os::unix::fs::symlink(root.join("gone.mkv"), root.join("link.mkv")).unwrap();

        let filter = MediaFilter::new(["mkv"]);
        let walker = MediaWalker::new(&root, &filter).unwrap();

        assert_eq!(media_paths(&walker.collect_entries()), ["link.mkv"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinks_to_files_and_directories() {
        let dir = TempDir::new().unwrap();
        let root = utf8_root(&dir);
        let target = TempDir::new().unwrap();
        let target_root = utf8_root(&target);
        fs::write(target_root.join("real.mkv"), "").unwrap();
        fs::create_dir_all(target_root.join("dir.mkv")).unwrap();
        fs::write(target_root.join("dir.mkv/nested.mkv"), "").unwrap();

        std::os::unix::fs::symlink(target_root.join("real.mkv"), root.join("file-link.mkv"))
            .unwrap();
        std::os::unix::fs::symlink(target_root.join("dir.mkv"), root.join("dir-link.mkv"))
            .unwrap();

        let filter = MediaFilter::new(["mkv"]).with_symlink_check(true);
        let walker = MediaWalker::new(&root, &filter).unwrap();

        assert_eq!(media_paths(&walker.collect_entries()), ["file-link.mkv"]);
    }
}
