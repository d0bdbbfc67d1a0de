#![allow(dead_code)]

//! A temporary download folder plus helpers that behave like a browser
//! writing into it from another thread.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::Result;
use dlwatch::fs::RealFileSystem;
use dlwatch::watch::snapshot;
use tempfile::TempDir;
use tracing::debug;

pub struct DownloadDir {
    dir: TempDir,
}

impl DownloadDir {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }

    /// Create (or overwrite) a file with some bytes in it.
    pub fn touch(&self, name: &str) -> Result<PathBuf> {
        let path = self.join(name);
        fs::write(&path, name.as_bytes())?;
        Ok(path)
    }

    pub fn with_files(self, names: &[&str]) -> Result<Self> {
        for name in names {
            self.touch(name)?;
        }
        Ok(self)
    }

    /// Current entry names, as a baseline for the watcher.
    pub fn snapshot(&self) -> Result<BTreeSet<String>> {
        Ok(snapshot(&RealFileSystem, self.path())?)
    }

    /// Write `<name><partial_suffix>` now, then rename it to `name` after
    /// `delay`, the way browsers finish a download.
    pub fn simulate_download(
        &self,
        name: &str,
        partial_suffix: &str,
        delay: Duration,
    ) -> Result<JoinHandle<()>> {
        let partial = self.join(&format!("{name}{partial_suffix}"));
        let done = self.join(name);
        fs::write(&partial, b"partial")?;

        Ok(thread::spawn(move || {
            thread::sleep(delay);
            if let Err(err) = fs::rename(&partial, &done) {
                debug!(error = %err, "simulated download rename failed");
            }
        }))
    }

    /// Create `name` after `delay` from another thread.
    pub fn create_later(&self, name: &str, delay: Duration) -> JoinHandle<()> {
        let path = self.join(name);
        thread::spawn(move || {
            thread::sleep(delay);
            if let Err(err) = fs::write(&path, b"late") {
                debug!(error = %err, "delayed create failed");
            }
        })
    }
}
