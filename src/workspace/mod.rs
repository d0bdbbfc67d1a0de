// src/workspace/mod.rs

//! Per-run working directories.
//!
//! A run gets this layout under a root `R`, with `T` the start timestamp:
//!
//! ```text
//! R/data/             <- wiped at the start of every run
//! R/data/T/
//! R/data/T/download/
//! R/data/T/output/
//! ```
//!
//! The layout is computed by an explicit call and handed to whoever needs
//! it; nothing is stored in globals.

pub mod timestamp;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::WorkspaceSettings;
use crate::errors::Result;

pub use timestamp::{DEFAULT_TIMESTAMP_FORMAT, DEFAULT_TIMEZONE, parse_timezone, render_timestamp};

pub const DATA_DIR_NAME: &str = "data";
pub const DOWNLOAD_DIR_NAME: &str = "download";
pub const OUTPUT_DIR_NAME: &str = "output";

#[derive(Debug, Clone, PartialEq)]
pub struct BootstrapOptions {
    pub root: PathBuf,
    pub timestamp_format: String,
    pub timezone: Tz,
}

impl Default for BootstrapOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            timezone: Tz::UTC,
        }
    }
}

impl BootstrapOptions {
    pub fn from_settings(settings: &WorkspaceSettings) -> Self {
        Self {
            root: settings.root.clone(),
            timestamp_format: settings.timestamp_format.clone(),
            timezone: settings.timezone,
        }
    }
}

/// Paths for one run. Serialized with the key names downstream workflow
/// steps read (`local_data_dir`, `local_temp_dir`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkspaceLayout {
    pub run_name: String,
    #[serde(rename = "local_data_dir")]
    pub data_dir: PathBuf,
    #[serde(rename = "local_temp_dir")]
    pub run_dir: PathBuf,
    #[serde(rename = "local_download_dir")]
    pub download_dir: PathBuf,
    #[serde(rename = "local_output_dir")]
    pub output_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the layout for a run starting at `now`. Touches nothing.
    pub fn plan(options: &BootstrapOptions, now: DateTime<Utc>) -> Result<Self> {
        let run_name = render_timestamp(now, &options.timestamp_format, options.timezone)?;
        let data_dir = options.root.join(DATA_DIR_NAME);
        let run_dir = data_dir.join(&run_name);

        Ok(Self {
            download_dir: run_dir.join(DOWNLOAD_DIR_NAME),
            output_dir: run_dir.join(OUTPUT_DIR_NAME),
            run_name,
            data_dir,
            run_dir,
        })
    }

    /// [`plan`](Self::plan) for the current time, with the root made
    /// absolute against the working directory.
    pub fn plan_now(options: &BootstrapOptions) -> Result<Self> {
        let options = BootstrapOptions {
            root: std::path::absolute(&options.root)?,
            ..options.clone()
        };
        Self::plan(&options, Utc::now())
    }

    /// Plan for now, then [`prepare`](Self::prepare).
    pub fn initialize(options: &BootstrapOptions) -> Result<Self> {
        let layout = Self::plan_now(options)?;
        layout.prepare()?;
        Ok(layout)
    }

    /// Wipe the previous `data` tree and create every directory of this
    /// layout.
    pub fn prepare(&self) -> Result<()> {
        remove_dir_forced(&self.data_dir)?;
        for dir in self.dirs() {
            fs::create_dir_all(dir)?;
        }
        info!(run = %self.run_name, root = %self.data_dir.display(), "workspace ready");
        Ok(())
    }

    /// All four directories, parents first.
    pub fn dirs(&self) -> [&Path; 4] {
        [
            &self.data_dir,
            &self.run_dir,
            &self.download_dir,
            &self.output_dir,
        ]
    }
}

/// Recursively delete `path`, retrying once after clearing read-only
/// permissions if the first attempt is refused.
///
/// Returns `Ok(false)` when there was nothing to delete.
pub fn remove_dir_forced(path: &Path) -> io::Result<bool> {
    if !path.exists() {
        debug!(path = %path.display(), "folder does not exist; nothing to remove");
        return Ok(false);
    }

    match fs::remove_dir_all(path) {
        Ok(()) => {}
        Err(err) if err.kind() == io::ErrorKind::PermissionDenied => {
            warn!(path = %path.display(), error = %err, "removal refused; clearing read-only flags and retrying");
            make_writable(path)?;
            fs::remove_dir_all(path)?;
        }
        Err(err) => return Err(err),
    }

    info!(path = %path.display(), "removed folder");
    Ok(true)
}

fn make_writable(path: &Path) -> io::Result<()> {
    let meta = fs::symlink_metadata(path)?;
    if meta.file_type().is_symlink() {
        return Ok(());
    }

    let mut perms = meta.permissions();
    if perms.readonly() {
        #[allow(clippy::permissions_set_readonly_false)]
        perms.set_readonly(false);
        fs::set_permissions(path, perms)?;
    }

    if meta.is_dir() {
        for entry in fs::read_dir(path)? {
            make_writable(&entry?.path())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 1, 9, 30, 0).unwrap()
    }

    #[test]
    fn plan_builds_expected_paths() {
        let options = BootstrapOptions {
            root: PathBuf::from("/work"),
            ..BootstrapOptions::default()
        };
        let layout = WorkspaceLayout::plan(&options, fixed()).unwrap();

        assert_eq!(layout.run_name, "20250501093000");
        assert_eq!(layout.data_dir, PathBuf::from("/work/data"));
        assert_eq!(layout.run_dir, PathBuf::from("/work/data/20250501093000"));
        assert_eq!(
            layout.download_dir,
            PathBuf::from("/work/data/20250501093000/download")
        );
        assert_eq!(
            layout.output_dir,
            PathBuf::from("/work/data/20250501093000/output")
        );
    }

    #[test]
    fn layout_serializes_with_downstream_key_names() {
        let options = BootstrapOptions {
            root: PathBuf::from("/work"),
            ..BootstrapOptions::default()
        };
        let layout = WorkspaceLayout::plan(&options, fixed()).unwrap();
        let json = serde_json::to_value(&layout).unwrap();

        assert_eq!(json["local_data_dir"], "/work/data");
        assert_eq!(json["local_temp_dir"], "/work/data/20250501093000");
        assert_eq!(json["local_download_dir"], "/work/data/20250501093000/download");
        assert_eq!(json["local_output_dir"], "/work/data/20250501093000/output");
        assert_eq!(json["run_name"], "20250501093000");
    }

    #[test]
    fn prepare_wipes_previous_data_and_creates_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let stale = tmp.path().join("data/20240101000000/download/old.csv");
        fs::create_dir_all(stale.parent().unwrap()).unwrap();
        fs::write(&stale, "old").unwrap();

        let options = BootstrapOptions {
            root: tmp.path().to_path_buf(),
            ..BootstrapOptions::default()
        };
        let layout = WorkspaceLayout::plan(&options, fixed()).unwrap();
        layout.prepare().unwrap();

        assert!(!stale.exists());
        for dir in layout.dirs() {
            assert!(dir.is_dir(), "{} should exist", dir.display());
        }
    }

    #[cfg(unix)]
    #[test]
    fn prepare_removes_read_only_trees() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::tempdir().unwrap();
        let locked_dir = tmp.path().join("data/old");
        fs::create_dir_all(&locked_dir).unwrap();
        fs::write(locked_dir.join("file.txt"), "x").unwrap();
        fs::set_permissions(&locked_dir, fs::Permissions::from_mode(0o555)).unwrap();

        let removed = remove_dir_forced(&tmp.path().join("data")).unwrap();

        assert!(removed);
        assert!(!tmp.path().join("data").exists());
    }

    #[test]
    fn removing_missing_folder_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!remove_dir_forced(&tmp.path().join("absent")).unwrap());
    }
}
