// src/fs/mod.rs

//! Filesystem access used by the waiters.
//!
//! Everything the polling loops need from the outside world goes through
//! [`FileSystem`], so the detection logic can be exercised against
//! [`mock::MockFileSystem`] without touching disk.

use std::collections::BTreeSet;
use std::fmt::Debug;
use std::fs;
use std::io;
use std::path::Path;
use std::time::SystemTime;

use tracing::trace;

pub mod mock;

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
    fn is_file(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;

    /// Names of the entries currently in `dir`. Never cached.
    fn list_names(&self, dir: &Path) -> io::Result<BTreeSet<String>>;

    /// Creation time, or modification time where the platform does not
    /// record creation.
    fn created(&self, path: &Path) -> io::Result<SystemTime>;

    fn modified(&self, path: &Path) -> io::Result<SystemTime>;

    /// Open `path` for a shared read and release it again.
    ///
    /// Succeeds only for a regular file that no other handle holds an
    /// exclusive lock on. The handle is closed before returning.
    fn probe_shared_read(&self, path: &Path) -> io::Result<()>;
}

/// Implementation that uses `std::fs` and `fs2` advisory locks.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_names(&self, dir: &Path) -> io::Result<BTreeSet<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            match entry.file_name().into_string() {
                Ok(name) => {
                    names.insert(name);
                }
                Err(raw) => trace!(?raw, "skipping non UTF-8 entry name"),
            }
        }
        Ok(names)
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        let meta = fs::metadata(path)?;
        match meta.created() {
            Ok(t) => Ok(t),
            Err(err) if err.kind() == io::ErrorKind::Unsupported => meta.modified(),
            Err(err) => Err(err),
        }
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn probe_shared_read(&self, path: &Path) -> io::Result<()> {
        let file = fs::File::open(path)?;
        if !file.metadata()?.is_file() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            ));
        }
        // Fully qualified: std's inherent File::try_lock_shared has a
        // different signature.
        fs2::FileExt::try_lock_shared(&file)?;
        fs2::FileExt::unlock(&file)?;
        Ok(())
    }
}
