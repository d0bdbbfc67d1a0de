// src/watch/request.rs

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::WatchSettings;
use crate::errors::Result;
use crate::watch::filter::EntryFilter;
use crate::watch::poll::PollSchedule;

/// Outcome of a wait. Timing out is an ordinary result, not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchResult {
    Found(PathBuf),
    TimedOut,
}

impl WatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, WatchResult::Found(_))
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            WatchResult::Found(p) => Some(p),
            WatchResult::TimedOut => None,
        }
    }

    pub fn into_path(self) -> Option<PathBuf> {
        match self {
            WatchResult::Found(p) => Some(p),
            WatchResult::TimedOut => None,
        }
    }
}

impl From<Option<PathBuf>> for WatchResult {
    fn from(value: Option<PathBuf>) -> Self {
        value.map_or(WatchResult::TimedOut, WatchResult::Found)
    }
}

/// Everything one call to the download watcher needs.
///
/// ```no_run
/// use std::time::Duration;
/// use dlwatch::watch::{snapshot, await_completed_download, WatchRequest};
/// use dlwatch::fs::RealFileSystem;
///
/// # fn main() -> dlwatch::errors::Result<()> {
/// let before = snapshot(&RealFileSystem, "Downloads".as_ref())?;
/// // ... start the download ...
/// let request = WatchRequest::new("Downloads")
///     .baseline(before)
///     .timeout(Duration::from_secs(120));
/// let result = await_completed_download(&request)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct WatchRequest {
    pub(crate) folder: PathBuf,
    pub(crate) expected_name: Option<String>,
    pub(crate) baseline: Option<BTreeSet<String>>,
    pub(crate) schedule: PollSchedule,
    pub(crate) filter: EntryFilter,
    pub(crate) verify_readable: bool,
}

impl WatchRequest {
    /// Request with default timeout (60s), poll interval (1s) and
    /// in-progress suffixes.
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
            expected_name: None,
            baseline: None,
            schedule: PollSchedule::default(),
            filter: EntryFilter::default(),
            verify_readable: true,
        }
    }

    /// Request seeded with the `[watch]` section of the config file.
    pub fn from_settings(folder: impl Into<PathBuf>, settings: &WatchSettings) -> Result<Self> {
        Ok(Self::new(folder)
            .timeout(settings.timeout)
            .poll_interval(settings.poll_interval)
            .filter(EntryFilter::new(
                settings.partial_suffixes.iter().cloned(),
                &settings.exclude,
            )?))
    }

    /// Only report this exact entry name.
    pub fn expected_name(mut self, name: impl Into<String>) -> Self {
        self.expected_name = Some(name.into());
        self
    }

    /// Names present before the triggering action.
    ///
    /// Without a baseline the watcher snapshots the folder when it starts,
    /// so a file that appeared between the trigger and the call is treated
    /// as pre-existing and never reported.
    pub fn baseline<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.baseline = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.schedule.timeout = timeout;
        self
    }

    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.schedule.interval = interval;
        self
    }

    pub fn schedule(mut self, schedule: PollSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    pub fn filter(mut self, filter: EntryFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether candidates must pass the shared-read probe (default `true`).
    pub fn verify_readable(mut self, verify: bool) -> Self {
        self.verify_readable = verify;
        self
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn expected(&self) -> Option<&str> {
        self.expected_name.as_deref()
    }

    pub fn poll_schedule(&self) -> PollSchedule {
        self.schedule
    }

    pub fn entry_filter(&self) -> &EntryFilter {
        &self.filter
    }

    /// What a hit means for this request, for log messages.
    pub(crate) fn target(&self) -> &'static str {
        if self.verify_readable {
            "completed download"
        } else {
            "new entry"
        }
    }
}
