// src/watch/download.rs

//! Download-completion detection.
//!
//! A download is considered complete when a name that was not in the
//! baseline shows up, carries no in-progress suffix, and can be opened for a
//! shared read. The probe is opportunistic: a writer that does not lock the
//! file will not be detected by it, but browsers renaming `*.crdownload` /
//! `*.part` into place are covered by the suffix filter.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::errors::{DlwatchError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::filter::{EntryFilter, new_entries};
use crate::watch::poll::{PollSchedule, poll_until, poll_until_async};
use crate::watch::request::{WatchRequest, WatchResult};

/// List the names currently in `folder`, to be used as a baseline.
pub fn snapshot(fs: &dyn FileSystem, folder: &Path) -> Result<BTreeSet<String>> {
    ensure_dir(fs, folder)?;
    list_names(fs, folder)
}

pub(crate) fn ensure_dir(fs: &dyn FileSystem, folder: &Path) -> Result<()> {
    if fs.is_dir(folder) {
        Ok(())
    } else {
        Err(DlwatchError::DirectoryNotFound(folder.to_path_buf()))
    }
}

pub(crate) fn list_names(fs: &dyn FileSystem, folder: &Path) -> Result<BTreeSet<String>> {
    fs.list_names(folder).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => DlwatchError::DirectoryNotFound(folder.to_path_buf()),
        _ => DlwatchError::IoError(err),
    })
}

/// State for one watch: the request plus the baseline fixed at start.
///
/// [`DownloadDetector::check`] performs a single poll and never sleeps; the
/// timing lives in [`crate::watch::poll`].
#[derive(Debug)]
pub struct DownloadDetector<'a> {
    fs: &'a dyn FileSystem,
    request: &'a WatchRequest,
    baseline: BTreeSet<String>,
}

impl<'a> DownloadDetector<'a> {
    /// Validate the request, check the folder exists, and fix the baseline.
    pub fn start(fs: &'a dyn FileSystem, request: &'a WatchRequest) -> Result<Self> {
        request.schedule.validate()?;
        ensure_dir(fs, &request.folder)?;

        let baseline = match &request.baseline {
            Some(names) => names.clone(),
            None => {
                let names = list_names(fs, &request.folder)?;
                debug!(
                    folder = %request.folder.display(),
                    entries = names.len(),
                    "no baseline supplied; using snapshot taken now"
                );
                names
            }
        };

        Ok(Self {
            fs,
            request,
            baseline,
        })
    }

    pub fn baseline(&self) -> &BTreeSet<String> {
        &self.baseline
    }

    /// New, admitted names, newest creation time first, then by name.
    pub fn candidates(&self) -> Result<Vec<String>> {
        let current = list_names(self.fs, &self.request.folder)?;
        let admitted = self.request.filter.apply(new_entries(&self.baseline, &current));
        Ok(order_newest_first(self.fs, &self.request.folder, admitted))
    }

    /// One poll: `Some(path)` if a qualifying candidate exists right now.
    pub fn check(&self) -> Result<Option<PathBuf>> {
        let folder = &self.request.folder;
        let current = list_names(self.fs, folder)?;
        let admitted = self.request.filter.apply(new_entries(&self.baseline, &current));

        if admitted.is_empty() {
            trace!(folder = %folder.display(), "no completed candidates yet");
            return Ok(None);
        }

        if let Some(name) = &self.request.expected_name {
            if !admitted.contains(name) {
                trace!(expected = %name, "expected entry not present yet");
                return Ok(None);
            }
            let path = folder.join(name);
            return Ok(self.is_ready(&path).then_some(path));
        }

        for name in order_newest_first(self.fs, folder, admitted) {
            let path = folder.join(&name);
            if self.is_ready(&path) {
                return Ok(Some(path));
            }
        }
        Ok(None)
    }

    fn is_ready(&self, path: &Path) -> bool {
        if !self.request.verify_readable {
            return true;
        }
        match self.fs.probe_shared_read(path) {
            Ok(()) => true,
            Err(err) => {
                debug!(
                    path = %path.display(),
                    kind = ?err.kind(),
                    error = %err,
                    "candidate not readable yet"
                );
                false
            }
        }
    }
}

/// Sort by creation time descending; equal (or unknown) times fall back to
/// ascending name so the choice is reproducible.
fn order_newest_first(fs: &dyn FileSystem, folder: &Path, names: BTreeSet<String>) -> Vec<String> {
    let mut keyed: Vec<(Option<SystemTime>, String)> = names
        .into_iter()
        .map(|name| (fs.created(&folder.join(&name)).ok(), name))
        .collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
    keyed.into_iter().map(|(_, name)| name).collect()
}

fn announce(request: &WatchRequest) {
    let what = request.target();
    info!(
        folder = %request.folder.display(),
        expected = ?request.expected_name,
        "waiting for {what}"
    );
}

fn report(request: &WatchRequest, found: Option<PathBuf>) -> WatchResult {
    let what = request.target();
    match &found {
        Some(path) => info!(path = %path.display(), "{what} detected"),
        None => warn!(
            folder = %request.folder.display(),
            timeout = ?request.schedule.timeout,
            "no {what} within timeout"
        ),
    }
    WatchResult::from(found)
}

/// Block until a completed download appears in `request.folder` or the
/// timeout elapses, using the real filesystem and clock.
pub fn await_completed_download(request: &WatchRequest) -> Result<WatchResult> {
    await_completed_download_with(&RealFileSystem, &SystemClock, request)
}

pub fn await_completed_download_with(
    fs: &dyn FileSystem,
    clock: &dyn Clock,
    request: &WatchRequest,
) -> Result<WatchResult> {
    announce(request);
    let detector = DownloadDetector::start(fs, request)?;
    let found = poll_until(clock, request.schedule, || detector.check())?;
    Ok(report(request, found))
}

/// Async flavour: sleeps on the Tokio timer between polls instead of
/// blocking the thread.
pub async fn await_completed_download_async(
    fs: &dyn FileSystem,
    request: &WatchRequest,
) -> Result<WatchResult> {
    announce(request);
    let detector = DownloadDetector::start(fs, request)?;
    let found = poll_until_async(request.schedule, || detector.check()).await?;
    Ok(report(request, found))
}

/// Request for "any entry that was not in the baseline", newest first: no
/// suffix filtering and no read probe.
pub fn new_entry_request(
    folder: impl Into<PathBuf>,
    baseline: Option<BTreeSet<String>>,
    schedule: PollSchedule,
) -> WatchRequest {
    let mut request = WatchRequest::new(folder)
        .schedule(schedule)
        .filter(EntryFilter::permissive())
        .verify_readable(false);
    request.baseline = baseline;
    request
}

/// Wait for any new entry in `folder`, returning the newest by creation time.
pub fn await_new_file(
    fs: &dyn FileSystem,
    clock: &dyn Clock,
    folder: &Path,
    baseline: Option<BTreeSet<String>>,
    schedule: PollSchedule,
) -> Result<WatchResult> {
    let request = new_entry_request(folder, baseline, schedule);
    await_completed_download_with(fs, clock, &request)
}
