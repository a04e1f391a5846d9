//! Per-run statistics.
//!
//! This module provides [`RunStats`], the accumulator filled in while a run
//! walks the scan roots, and [`RunSummary`], the frozen view handed to the
//! notifier once the run is over.
//!
//! A run is single-threaded, so the counters are plain integers.
//!
//! # Examples
//!
//! ```
//! use rescan_scanner::RunStats;
//!
//! let mut stats = RunStats::new();
//! stats.increment_scanned();
//! stats.increment_scanned();
//! stats.add_missing_item("Movies", "/media/movies/b.mkv");
//!
//! let summary = stats.snapshot();
//! assert_eq!(summary.total_scanned, 2);
//! assert_eq!(summary.total_missing, 1);
//! assert_eq!(summary.missing_items[0].library, "Movies");
//! ```

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rescan_core::FxHashMap;
use serde::{Deserialize, Serialize};

/// Accumulates counters, missing files and issues during one run.
#[derive(Debug)]
pub struct RunStats {
    /// Wall-clock start of the run.
    started_at: DateTime<Utc>,
    /// Monotonic start of the run, for the elapsed time.
    started: Instant,
    /// Media files considered (after the hidden/extension/symlink filters).
    total_scanned: u64,
    /// Media files the index does not know.
    total_missing: u64,
    /// Symlinks skipped because their target is gone.
    broken_symlinks: u64,
    /// Missing files grouped by library title, in discovery order.
    missing_items: Vec<LibraryMissing>,
    /// Position of each library title in `missing_items`.
    positions: FxHashMap<String, usize>,
    /// Run-level and per-library failures.
    errors: Vec<String>,
    /// Non-fatal oddities (unowned files, failed refreshes, walk hiccups).
    warnings: Vec<String>,
}

impl Default for RunStats {
    fn default() -> Self {
        Self::new()
    }
}

impl RunStats {
    /// Starts a fresh accumulator; the run clock starts now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            started: Instant::now(),
            total_scanned: 0,
            total_missing: 0,
            broken_symlinks: 0,
            missing_items: Vec::new(),
            positions: FxHashMap::default(),
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Counts one media file as scanned.
    #[inline]
    pub fn increment_scanned(&mut self) {
        self.total_scanned += 1;
    }

    /// Counts one skipped broken symlink.
    #[inline]
    pub fn increment_broken_symlinks(&mut self) {
        self.broken_symlinks += 1;
    }

    /// Records a missing file under its library title.
    ///
    /// Libraries keep the order in which their first missing file was found.
    pub fn add_missing_item(&mut self, library: &str, path: impl Into<String>) {
        self.total_missing += 1;

        let position = match self.positions.get(library) {
            Some(&position) => position,
            None => {
                let position = self.missing_items.len();
                self.missing_items.push(LibraryMissing {
                    library: library.to_owned(),
                    items: Vec::new(),
                });
                self.positions.insert(library.to_owned(), position);
                position
            }
        };

        self.missing_items[position].items.push(path.into());
    }

    /// Records an error message.
    pub fn add_error(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Records a warning message.
    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Number of media files scanned so far.
    #[inline]
    #[must_use]
    pub const fn total_scanned(&self) -> u64 {
        self.total_scanned
    }

    /// Number of missing files found so far.
    #[inline]
    #[must_use]
    pub const fn total_missing(&self) -> u64 {
        self.total_missing
    }

    /// Number of broken symlinks skipped so far.
    #[inline]
    #[must_use]
    pub const fn broken_symlinks(&self) -> u64 {
        self.broken_symlinks
    }

    /// Errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Warnings recorded so far.
    #[must_use]
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Time elapsed since the run started.
    #[must_use]
    pub fn run_time(&self) -> Duration {
        self.started.elapsed()
    }

    /// Freezes the current state into a [`RunSummary`].
    #[must_use]
    pub fn snapshot(&self) -> RunSummary {
        RunSummary {
            started_at: self.started_at,
            run_time: self.run_time(),
            total_scanned: self.total_scanned,
            total_missing: self.total_missing,
            broken_symlinks: self.broken_symlinks,
            missing_items: self.missing_items.clone(),
            errors: self.errors.clone(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Missing files of one library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryMissing {
    /// Library title.
    pub library: String,
    /// Missing file paths, in discovery order.
    pub items: Vec<String>,
}

/// Frozen statistics of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Wall-clock start of the run.
    pub started_at: DateTime<Utc>,
    /// Elapsed run time.
    pub run_time: Duration,
    /// Media files scanned.
    pub total_scanned: u64,
    /// Media files missing from the index.
    pub total_missing: u64,
    /// Broken symlinks skipped.
    pub broken_symlinks: u64,
    /// Missing files per library, in discovery order.
    pub missing_items: Vec<LibraryMissing>,
    /// Errors recorded during the run.
    pub errors: Vec<String>,
    /// Warnings recorded during the run.
    pub warnings: Vec<String>,
}

impl RunSummary {
    /// Formats the run time as `H:MM:SS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::time::Duration;
    /// use rescan_scanner::RunStats;
    ///
    /// let mut summary = RunStats::new().snapshot();
    /// summary.run_time = Duration::from_secs(3725);
    /// assert_eq!(summary.format_run_time(), "1:02:05");
    /// ```
    #[must_use]
    pub fn format_run_time(&self) -> String {
        let secs = self.run_time.as_secs();
        format!("{}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }

    /// Returns `true` if anything went wrong or was skipped.
    #[must_use]
    pub fn has_issues(&self) -> bool {
        self.broken_symlinks > 0 || !self.errors.is_empty() || !self.warnings.is_empty()
    }

    /// Returns `true` if the run found missing files or issues worth reporting.
    #[must_use]
    pub fn has_findings(&self) -> bool {
        self.total_missing > 0 || self.has_issues()
    }
}
