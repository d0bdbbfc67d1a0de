// src/watch/mod.rs

//! Polling waiters.
//!
//! This module is responsible for:
//! - Detecting completed downloads in a folder (`download`), relative to a
//!   baseline snapshot and ignoring in-progress suffixes (`filter`).
//! - Waiting for a known path to exist or become readable (`file`).
//! - Finding the most recently modified file in a folder (`latest`).
//!
//! All timing goes through `poll`, which has a blocking and an async driver.
//! Nothing here renames, moves or deletes files.

pub mod download;
pub mod file;
pub mod filter;
pub mod latest;
pub mod poll;
pub mod request;

pub use download::{
    DownloadDetector, await_completed_download, await_completed_download_async,
    await_completed_download_with, await_new_file, new_entry_request, snapshot,
};
pub use file::{
    wait_for_file, wait_for_file_async, wait_for_readable_file, wait_for_readable_file_async,
};
pub use filter::{DEFAULT_PARTIAL_SUFFIXES, EntryFilter, new_entries};
pub use latest::latest_file;
pub use poll::{PollSchedule, poll_until, poll_until_async};
pub use request::{WatchRequest, WatchResult};
