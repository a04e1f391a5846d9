//! Folder refresh dispatch.
//!
//! This module provides [`ReindexDispatcher`], which asks the media index to
//! re-scan the folder holding a missing file. Each folder is requested at
//! most once per run, and every request is followed by a pause so the index
//! is not flooded.
//!
//! The pause goes through the [`Throttle`] trait so tests can run without
//! sleeping.

use std::time::Duration;

use camino::{Utf8Path, Utf8PathBuf};
use rescan_core::{FxHashSet, LibraryId, MediaIndex};
use tracing::{error, info};

use crate::stats::RunStats;

/// Waits between two refresh requests.
pub trait Throttle {
    /// Blocks for `interval`.
    fn pause(&self, interval: Duration);
}

/// The production [`Throttle`]: sleeps the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct SleepThrottle;

impl Throttle for SleepThrottle {
    fn pause(&self, interval: Duration) {
        if !interval.is_zero() {
            std::thread::sleep(interval);
        }
    }
}

/// A [`Throttle`] that returns immediately.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoThrottle;

impl Throttle for NoThrottle {
    fn pause(&self, _interval: Duration) {}
}

/// What happened to a dispatch request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The refresh was sent and accepted.
    Requested,
    /// The refresh was sent and failed; the folder still counts as dispatched.
    Failed,
    /// The folder was already dispatched in this run.
    AlreadyDispatched,
    /// Dry run: the folder was recorded but nothing was sent.
    Skipped,
}

/// Sends at most one refresh request per folder per run.
pub struct ReindexDispatcher<'a, I: ?Sized> {
    /// The index receiving refresh requests.
    index: &'a I,
    /// Pause after each request.
    interval: Duration,
    /// How the pause is taken.
    throttle: &'a dyn Throttle,
    /// Record folders without contacting the index.
    dry_run: bool,
    /// Folders dispatched in this run.
    dispatched: FxHashSet<Utf8PathBuf>,
}

impl<I: ?Sized> std::fmt::Debug for ReindexDispatcher<'_, I> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReindexDispatcher")
            .field("interval", &self.interval)
            .field("dry_run", &self.dry_run)
            .field("dispatched", &self.dispatched.len())
            .finish_non_exhaustive()
    }
}

impl<'a, I: MediaIndex + ?Sized> ReindexDispatcher<'a, I> {
    /// Creates a dispatcher pausing `interval` after each request.
    pub fn new(index: &'a I, interval: Duration, throttle: &'a dyn Throttle) -> Self {
        Self {
            index,
            interval,
            throttle,
            dry_run: false,
            dispatched: FxHashSet::default(),
        }
    }

    /// Records folders without sending anything to the index.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Requests a refresh of `folder` in `library` unless already done.
    ///
    /// A failed request is logged and recorded as a warning; the folder is
    /// still marked so it is not retried in this run.
    pub fn dispatch(
        &mut self,
        library: &LibraryId,
        folder: &Utf8Path,
        stats: &mut RunStats,
    ) -> DispatchOutcome {
        if !self.dispatched.insert(folder.to_owned()) {
            return DispatchOutcome::AlreadyDispatched;
        }

        if self.dry_run {
            info!(%folder, library = %library, "Dry run: would request folder refresh");
            return DispatchOutcome::Skipped;
        }

        let outcome = match self.index.refresh(library, folder) {
            Ok(()) => {
                info!(%folder, library = %library, "Requested folder refresh");
                DispatchOutcome::Requested
            }
            Err(err) => {
                error!(%folder, library = %library, error = %err, "Folder refresh failed");
                stats.add_warning(format!("Failed to refresh {folder}: {err}"));
                DispatchOutcome::Failed
            }
        };

        self.throttle.pause(self.interval);
        outcome
    }

    /// Number of distinct folders dispatched in this run.
    #[inline]
    #[must_use]
    pub fn dispatched_count(&self) -> usize {
        self.dispatched.len()
    }

    /// Returns `true` if `folder` was already dispatched in this run.
    #[must_use]
    pub fn is_dispatched(&self, folder: &Utf8Path) -> bool {
        self.dispatched.contains(folder)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use rescan_core::{IndexError, LibraryDescriptor, MediaItem};

    use super::*;

    #[derive(Default)]
    struct RecordingIndex {
        refreshed: RefCell<Vec<(String, String)>>,
        fail: bool,
    }

    impl MediaIndex for RecordingIndex {
        fn sections(&self) -> Result<Vec<LibraryDescriptor>, IndexError> {
            Ok(Vec::new())
        }

        fn items(&self, _library: &LibraryId) -> Result<Vec<MediaItem>, IndexError> {
            Ok(Vec::new())
        }

        fn episodes(&self, _show: &MediaItem) -> Result<Vec<MediaItem>, IndexError> {
            Ok(Vec::new())
        }

        fn refresh(&self, library: &LibraryId, folder: &Utf8Path) -> Result<(), IndexError> {
            self.refreshed
                .borrow_mut()
                .push((library.to_string(), folder.to_string()));
            if self.fail {
                return Err(IndexError::backend("refresh", std::io::Error::other("503")));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingThrottle {
        pauses: RefCell<Vec<Duration>>,
    }

    impl Throttle for CountingThrottle {
        fn pause(&self, interval: Duration) {
            self.pauses.borrow_mut().push(interval);
        }
    }

    #[test]
    fn test_dispatch_once_per_folder() {
        let index = RecordingIndex::default();
        let throttle = CountingThrottle::default();
        let mut stats = RunStats::new();
        let mut dispatcher = ReindexDispatcher::new(&index, Duration::from_secs(5), &throttle);
        let movies = LibraryId::new("1");
        let folder = Utf8Path::new("/media/movies/Heat (1995)");

        assert_eq!(
            dispatcher.dispatch(&movies, folder, &mut stats),
            DispatchOutcome::Requested
        );
        assert_eq!(
            dispatcher.dispatch(&movies, folder, &mut stats),
            DispatchOutcome::AlreadyDispatched
        );

        assert_eq!(index.refreshed.borrow().len(), 1);
        assert_eq!(throttle.pauses.borrow().as_slice(), [Duration::from_secs(5)]);
        assert_eq!(dispatcher.dispatched_count(), 1);
        assert!(dispatcher.is_dispatched(folder));
    }

    #[test]
    fn test_failed_refresh_still_marks_folder() {
        let index = RecordingIndex {
            fail: true,
            ..RecordingIndex::default()
        };
        let throttle = NoThrottle;
        let mut stats = RunStats::new();
        let mut dispatcher = ReindexDispatcher::new(&index, Duration::ZERO, &throttle);
        let tv = LibraryId::new("2");
        let folder = Utf8Path::new("/media/tv/Show/Season 1");

        assert_eq!(dispatcher.dispatch(&tv, folder, &mut stats), DispatchOutcome::Failed);
        assert_eq!(
            dispatcher.dispatch(&tv, folder, &mut stats),
            DispatchOutcome::AlreadyDispatched
        );

        assert_eq!(index.refreshed.borrow().len(), 1);
        assert_eq!(stats.warnings().len(), 1);
        assert!(stats.warnings()[0].contains("Season 1"));
    }

    #[test]
    fn test_dry_run_sends_nothing() {
        let index = RecordingIndex::default();
        let throttle = CountingThrottle::default();
        let mut stats = RunStats::new();
        let mut dispatcher =
            ReindexDispatcher::new(&index, Duration::from_secs(5), &throttle).with_dry_run(true);

        let outcome =
            dispatcher.dispatch(&LibraryId::new("1"), Utf8Path::new("/media/movies/X"), &mut stats);

        assert_eq!(outcome, DispatchOutcome::Skipped);
        assert!(index.refreshed.borrow().is_empty());
        assert!(throttle.pauses.borrow().is_empty());
        assert_eq!(dispatcher.dispatched_count(), 1);
    }
}
