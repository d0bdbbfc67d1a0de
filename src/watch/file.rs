// src/watch/file.rs

//! Waiting on a single known path.
//!
//! - [`wait_for_file`]: the path exists (file or directory).
//! - [`wait_for_readable_file`]: the path is a regular file that passes the
//!   shared-read probe.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::poll::{PollSchedule, poll_until, poll_until_async};
use crate::watch::request::WatchResult;

fn exists_step<'a>(
    fs: &'a dyn FileSystem,
    path: &'a Path,
) -> impl FnMut() -> Result<Option<PathBuf>> + 'a {
    move || Ok(fs.exists(path).then(|| path.to_path_buf()))
}

fn readable_step<'a>(
    fs: &'a dyn FileSystem,
    path: &'a Path,
) -> impl FnMut() -> Result<Option<PathBuf>> + 'a {
    move || {
        if !fs.is_file(path) {
            return Ok(None);
        }
        match fs.probe_shared_read(path) {
            Ok(()) => Ok(Some(path.to_path_buf())),
            Err(err) => {
                debug!(path = %path.display(), error = %err, "file not readable yet");
                Ok(None)
            }
        }
    }
}

fn report(what: &str, path: &Path, schedule: PollSchedule, found: Option<PathBuf>) -> WatchResult {
    match &found {
        Some(_) => info!(path = %path.display(), "{what}"),
        None => warn!(path = %path.display(), timeout = ?schedule.timeout, "timed out waiting: {what}"),
    }
    WatchResult::from(found)
}

pub fn wait_for_file(
    fs: &dyn FileSystem,
    clock: &dyn Clock,
    path: &Path,
    schedule: PollSchedule,
) -> Result<WatchResult> {
    let found = poll_until(clock, schedule, exists_step(fs, path))?;
    Ok(report("file exists", path, schedule, found))
}

pub async fn wait_for_file_async(
    fs: &dyn FileSystem,
    path: &Path,
    schedule: PollSchedule,
) -> Result<WatchResult> {
    let found = poll_until_async(schedule, exists_step(fs, path)).await?;
    Ok(report("file exists", path, schedule, found))
}

pub fn wait_for_readable_file(
    fs: &dyn FileSystem,
    clock: &dyn Clock,
    path: &Path,
    schedule: PollSchedule,
) -> Result<WatchResult> {
    let found = poll_until(clock, schedule, readable_step(fs, path))?;
    Ok(report("file readable", path, schedule, found))
}

pub async fn wait_for_readable_file_async(
    fs: &dyn FileSystem,
    path: &Path,
    schedule: PollSchedule,
) -> Result<WatchResult> {
    let found = poll_until_async(schedule, readable_step(fs, path)).await?;
    Ok(report("file readable", path, schedule, found))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::fs::mock::MockFileSystem;
    use std::time::Duration;

    fn schedule(timeout: u64) -> PollSchedule {
        PollSchedule::new(Duration::from_secs(timeout), Duration::from_secs(1))
    }

    #[test]
    fn file_appearing_later_is_found() {
        let fs = MockFileSystem::new();
        let clock = ManualClock::new().on_sleep({
            let fs = fs.clone();
            move |elapsed| {
                if elapsed == Duration::from_secs(2) {
                    fs.add_file("out/result.json");
                }
            }
        });

        let path = Path::new("out/result.json");
        let result = wait_for_file(&fs, &clock, path, schedule(10)).unwrap();

        assert_eq!(result, WatchResult::Found(path.to_path_buf()));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn missing_file_times_out() {
        let fs = MockFileSystem::new();
        let clock = ManualClock::new();

        let result = wait_for_file(&fs, &clock, Path::new("never"), schedule(3)).unwrap();

        assert_eq!(result, WatchResult::TimedOut);
        assert_eq!(clock.elapsed(), Duration::from_secs(3));
    }

    #[test]
    fn readable_waits_for_lock_release() {
        let fs = MockFileSystem::new();
        fs.add_file("out/data.csv");
        fs.set_locked("out/data.csv", true);

        let clock = ManualClock::new().on_sleep({
            let fs = fs.clone();
            move |elapsed| {
                if elapsed == Duration::from_secs(1) {
                    fs.set_locked("out/data.csv", false);
                }
            }
        });

        let path = Path::new("out/data.csv");
        let result = wait_for_readable_file(&fs, &clock, path, schedule(5)).unwrap();
        assert_eq!(result, WatchResult::Found(path.to_path_buf()));
    }

    #[test]
    fn readable_rejects_directories() {
        let fs = MockFileSystem::new();
        fs.add_dir("out/folder");
        let clock = ManualClock::new();

        let result =
            wait_for_readable_file(&fs, &clock, Path::new("out/folder"), schedule(2)).unwrap();
        assert_eq!(result, WatchResult::TimedOut);
    }
}
