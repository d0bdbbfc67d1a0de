// src/watch/latest.rs

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::watch::download::{ensure_dir, list_names};

/// The most recently modified regular file directly inside `folder`.
///
/// Subdirectories are ignored. Equal modification times resolve to the
/// lexicographically smaller name. Returns `Ok(None)` for a folder with no
/// regular files.
pub fn latest_file(fs: &dyn FileSystem, folder: &Path) -> Result<Option<PathBuf>> {
    ensure_dir(fs, folder)?;

    let latest = list_names(fs, folder)?
        .into_iter()
        .map(|name| folder.join(name))
        .filter(|path| fs.is_file(path))
        .filter_map(|path| fs.modified(&path).ok().map(|t| (t, path)))
        .max_by_key(|(t, path)| (*t, Reverse(path.clone())))
        .map(|(_, path)| path);

    match &latest {
        Some(path) => info!(path = %path.display(), "latest file"),
        None => debug!(folder = %folder.display(), "no files in folder"),
    }
    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DlwatchError;
    use crate::fs::mock::MockFileSystem;
    use std::time::{Duration, SystemTime};

    #[test]
    fn picks_most_recently_modified() {
        let fs = MockFileSystem::new();
        fs.add_file("dl/a.txt");
        fs.add_file("dl/b.txt");
        fs.touch("dl/a.txt");

        let latest = latest_file(&fs, Path::new("dl")).unwrap();
        assert_eq!(latest, Some(PathBuf::from("dl/a.txt")));
    }

    #[test]
    fn ties_resolve_to_smaller_name() {
        let fs = MockFileSystem::new();
        let t = SystemTime::UNIX_EPOCH + Duration::from_secs(10);
        fs.add_file_created("dl/zeta.txt", t);
        fs.add_file_created("dl/alpha.txt", t);

        let latest = latest_file(&fs, Path::new("dl")).unwrap();
        assert_eq!(latest, Some(PathBuf::from("dl/alpha.txt")));
    }

    #[test]
    fn directories_are_ignored() {
        let fs = MockFileSystem::new();
        fs.add_dir("dl/only-a-dir");

        assert_eq!(latest_file(&fs, Path::new("dl")).unwrap(), None);
    }

    #[test]
    fn missing_folder_is_an_error() {
        let fs = MockFileSystem::new();
        let err = latest_file(&fs, Path::new("missing")).unwrap_err();
        assert!(matches!(err, DlwatchError::DirectoryNotFound(_)));
    }
}
