//! Missing-media detection engine.
//!
//! This crate walks the configured scan roots, works out which library owns
//! every media file it finds, checks whether the media index already knows
//! the file, and asks the index to re-scan the folders of files it doesn't.
//!
//! # Overview
//!
//! The main entry point is [`Scanner`], which combines:
//!
//! - [`LibraryRegistry`]: longest-prefix mapping from path to library
//! - [`LibraryFileCache`]: lazily fetched per-library file sets
//! - [`MediaWalker`]: directory traversal with the [`MediaFilter`] rules
//! - [`ReindexDispatcher`]: one throttled refresh request per folder
//! - [`RunStats`]: counters and findings, frozen into a [`RunSummary`]
//!
//! # Example
//!
//! ```ignore
//! use rescan_scanner::{ScanOptions, Scanner};
//!
//! let scanner = Scanner::new(plex_client, ScanOptions::from_config(&config));
//! let summary = scanner.run(&config.scan.directories);
//!
//! println!("{} missing out of {} scanned", summary.total_missing, summary.total_scanned);
//! ```
//!
//! # Architecture
//!
//! ```text
//! Scanner::run
//!     │
//!     ├── LibraryRegistry::build (one section listing per run)
//!     │
//!     └── RunContext (per run)
//!             │
//!             ├── MediaWalker (one pass per root, ignore crate)
//!             ├── LibraryFileCache (one listing per library)
//!             ├── ReindexDispatcher (one refresh per folder)
//!             └── RunStats
//! ```
//!
//! A run is strictly sequential. Nothing survives from one run to the next.

#![deny(clippy::all)]
#![warn(missing_docs)]

mod cache;
mod dispatch;
mod error;
mod index;
pub mod path;
mod registry;
mod stats;
mod walker;

pub use cache::LibraryFileCache;
pub use dispatch::{DispatchOutcome, NoThrottle, ReindexDispatcher, SleepThrottle, Throttle};
pub use error::ScanError;
pub use index::LibraryLayout;
pub use registry::LibraryRegistry;
pub use stats::{LibraryMissing, RunStats, RunSummary};
pub use walker::{MediaFilter, MediaWalker, WalkEntry};

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use rescan_core::{Config, DEFAULT_MEDIA_EXTENSIONS, MediaIndex};
use tracing::{debug, error, info, warn};

/// Options for a scan run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    /// Recognised media extensions.
    pub media_extensions: Vec<String>,
    /// Skip and count broken symlinks.
    pub symlink_check: bool,
    /// Pause after every refresh request.
    pub scan_interval: Duration,
    /// Section types that must exist for the run to proceed.
    pub required_library_types: Vec<String>,
    /// Detect and report, but never send refresh requests.
    pub dry_run: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            media_extensions: DEFAULT_MEDIA_EXTENSIONS
                .iter()
                .map(|ext| (*ext).to_owned())
                .collect(),
            symlink_check: false,
            scan_interval: Duration::from_secs(5),
            required_library_types: vec!["movie".to_owned(), "show".to_owned()],
            dry_run: false,
        }
    }
}

impl ScanOptions {
    /// Derives the options from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            media_extensions: config.scan.media_extensions.clone(),
            symlink_check: config.behaviour.symlink_check,
            scan_interval: config.behaviour.scan_interval(),
            required_library_types: config.scan.required_library_types.clone(),
            dry_run: false,
        }
    }

    /// Sets dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }
}

/// Runs missing-media scans against a media index.
pub struct Scanner<I> {
    /// The media index.
    index: I,
    /// Run options.
    options: ScanOptions,
    /// Media filter derived from the options.
    filter: MediaFilter,
    /// Pause strategy between refresh requests.
    throttle: Box<dyn Throttle + Send + Sync>,
}

impl<I> std::fmt::Debug for Scanner<I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scanner")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<I: MediaIndex> Scanner<I> {
    /// Creates a scanner that sleeps between refresh requests.
    pub fn new(index: I, options: ScanOptions) -> Self {
        let filter = MediaFilter::new(&options.media_extensions)
            .with_symlink_check(options.symlink_check);

        Self {
            index,
            options,
            filter,
            throttle: Box::new(SleepThrottle),
        }
    }

    /// Replaces the pause strategy.
    #[must_use]
    pub fn with_throttle(mut self, throttle: impl Throttle + Send + Sync + 'static) -> Self {
        self.throttle = Box::new(throttle);
        self
    }

    /// Returns the run options.
    #[must_use]
    pub const fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Returns the media index.
    #[must_use]
    pub const fn index(&self) -> &I {
        &self.index
    }

    /// Performs one complete run over `roots`.
    ///
    /// Never fails: run-level problems (no sections, missing required
    /// libraries) end the run early and show up in the summary's errors.
    pub fn run(&self, roots: &[Utf8PathBuf]) -> RunSummary {
        let mut stats = RunStats::new();
        info!(roots = roots.len(), dry_run = self.options.dry_run, "Starting scan run");

        if let Err(err) = self.scan(roots, &mut stats) {
            error!(error = %err, "Scan run aborted");
            stats.add_error(err.to_string());
        }

        let summary = stats.snapshot();
        info!(
            scanned = summary.total_scanned,
            missing = summary.total_missing,
            broken_symlinks = summary.broken_symlinks,
            errors = summary.errors.len(),
            warnings = summary.warnings.len(),
            run_time = %summary.format_run_time(),
            "Scan run complete"
        );
        summary
    }

    /// Builds the per-run state and walks every root.
    fn scan(&self, roots: &[Utf8PathBuf], stats: &mut RunStats) -> Result<(), ScanError> {
        let registry = LibraryRegistry::build(&self.index)?;

        let missing = registry.missing_kinds(&self.options.required_library_types);
        if !missing.is_empty() {
            return Err(ScanError::MissingLibraryTypes(
                missing.into_iter().map(str::to_owned).collect(),
            ));
        }

        let dispatcher =
            ReindexDispatcher::new(&self.index, self.options.scan_interval, &*self.throttle)
                .with_dry_run(self.options.dry_run);

        let mut context = RunContext {
            index: &self.index,
            registry: &registry,
            cache: LibraryFileCache::new(),
            dispatcher,
            stats,
        };

        for root in roots {
            context.scan_root(root, &self.filter);
        }

        debug!(
            libraries_cached = context.cache.library_count(),
            folders_dispatched = context.dispatcher.dispatched_count(),
            "Run context released"
        );
        Ok(())
    }
}

/// State owned by a single run.
struct RunContext<'a, I: ?Sized> {
    index: &'a I,
    registry: &'a LibraryRegistry,
    cache: LibraryFileCache,
    dispatcher: ReindexDispatcher<'a, I>,
    stats: &'a mut RunStats,
}

impl<I: MediaIndex + ?Sized> RunContext<'_, I> {
    /// Walks one root; a missing root is recorded and skipped.
    fn scan_root(&mut self, root: &Utf8Path, filter: &MediaFilter) {
        info!(%root, "Scanning directory");

        let walker = match MediaWalker::new(root, filter) {
            Ok(walker) => walker,
            Err(err) => {
                error!(%root, error = %err, "Skipping scan directory");
                self.stats.add_error(err.to_string());
                return;
            }
        };

        walker.walk(|entry| self.visit(entry));
    }

    fn visit(&mut self, entry: WalkEntry) {
        match entry {
            WalkEntry::Media(path) => self.check_file(&path),
            WalkEntry::BrokenSymlink(path) => {
                warn!(%path, "Skipping broken symlink");
                self.stats.increment_broken_symlinks();
            }
            WalkEntry::Error(err) => {
                warn!(error = %err, "Skipping unreadable entry");
                self.stats.add_warning(err.to_string());
            }
        }
    }

    /// Checks one media file against the index and dispatches if missing.
    fn check_file(&mut self, path: &Utf8Path) {
        self.stats.increment_scanned();

        let Some(owner) = self.registry.resolve_owner(path) else {
            warn!(%path, "Could not determine library for path");
            self.stats
                .add_warning(format!("Could not determine library for path: {path}"));
            return;
        };

        if let Some(library) = self.registry.library(&owner.id) {
            self.cache.ensure_cached(library, self.index, self.stats);
        }

        if self.cache.contains(&owner.id, path.as_str()) {
            debug!(%path, "Found in index");
            return;
        }

        info!(%path, library = %owner.title, "Found missing item");
        self.stats.add_missing_item(&owner.title, path.as_str());

        let folder = path.parent().unwrap_or(path);
        self.dispatcher.dispatch(&owner.id, folder, self.stats);
    }
}
