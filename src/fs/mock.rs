// src/fs/mock.rs

use super::FileSystem;
use std::collections::{BTreeSet, HashMap};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File {
        created: SystemTime,
        modified: SystemTime,
        locked: bool,
    },
    Dir(BTreeSet<String>), // child names
}

#[derive(Debug, Default)]
struct MockState {
    entries: HashMap<PathBuf, MockEntry>,
    /// Logical clock for timestamps; every mutation moves it forward by 1s.
    tick: u64,
}

impl MockState {
    fn next_time(&mut self) -> SystemTime {
        self.tick += 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(self.tick)
    }
}

/// In-memory filesystem for tests.
///
/// Cloning shares the underlying state, so a test can keep a handle and
/// mutate the tree while a waiter polls another handle.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        let mut entries = HashMap::new();
        // Ensure root exists
        entries.insert(PathBuf::from("."), MockEntry::Dir(BTreeSet::new()));

        Self {
            state: Arc::new(Mutex::new(MockState { entries, tick: 0 })),
        }
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        ensure_dir_entry(&mut state.entries, path.as_ref());
    }

    /// Add (or replace) a file stamped with the next logical time, so files
    /// added later always look newer.
    pub fn add_file(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        let now = state.next_time();
        insert_file(&mut state.entries, path.as_ref(), now, now);
    }

    /// Add (or replace) a file with an explicit creation time.
    pub fn add_file_created(&self, path: impl AsRef<Path>, created: SystemTime) {
        let mut state = self.state();
        insert_file(&mut state.entries, path.as_ref(), created, created);
    }

    /// Bump a file's modification time to the next logical time.
    pub fn touch(&self, path: impl AsRef<Path>) {
        let mut state = self.state();
        let now = state.next_time();
        if let Some(MockEntry::File { modified, .. }) = state.entries.get_mut(path.as_ref()) {
            *modified = now;
        }
    }

    /// Simulate another process holding (or releasing) an exclusive lock.
    pub fn set_locked(&self, path: impl AsRef<Path>, value: bool) {
        let mut state = self.state();
        if let Some(MockEntry::File { locked, .. }) = state.entries.get_mut(path.as_ref()) {
            *locked = value;
        }
    }

    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.state();
        if state.entries.remove(path).is_some() {
            detach_from_parent(&mut state.entries, path);
        }
    }

    /// Rename a file, keeping its timestamps and lock state.
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) {
        let (from, to) = (from.as_ref(), to.as_ref());
        let mut state = self.state();
        if let Some(entry) = state.entries.remove(from) {
            detach_from_parent(&mut state.entries, from);
            state.entries.insert(to.to_path_buf(), entry);
            attach_to_parent(&mut state.entries, to);
        }
    }
}

fn parent_of(path: &Path) -> Option<&Path> {
    let parent = path.parent()?;
    if parent.as_os_str().is_empty() {
        Some(Path::new("."))
    } else {
        Some(parent)
    }
}

fn insert_file(
    entries: &mut HashMap<PathBuf, MockEntry>,
    path: &Path,
    created: SystemTime,
    modified: SystemTime,
) {
    entries.insert(
        path.to_path_buf(),
        MockEntry::File {
            created,
            modified,
            locked: false,
        },
    );
    attach_to_parent(entries, path);
}

fn attach_to_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if parent == path {
        return;
    }
    ensure_dir_entry(entries, parent);
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        entries.get_mut(parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        children.insert(name.to_string());
    }
}

fn detach_from_parent(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    let Some(parent) = parent_of(path) else {
        return;
    };
    if let (Some(MockEntry::Dir(children)), Some(name)) = (
        entries.get_mut(parent),
        path.file_name().and_then(|n| n.to_str()),
    ) {
        children.remove(name);
    }
}

fn ensure_dir_entry(entries: &mut HashMap<PathBuf, MockEntry>, path: &Path) {
    if entries.contains_key(path) {
        return;
    }
    entries.insert(path.to_path_buf(), MockEntry::Dir(BTreeSet::new()));
    attach_to_parent(entries, path);
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found", path.display()),
    )
}

impl FileSystem for MockFileSystem {
    fn exists(&self, path: &Path) -> bool {
        self.state().entries.contains_key(path)
    }

    fn is_file(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::File { .. }))
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.state().entries.get(path), Some(MockEntry::Dir(_)))
    }

    fn list_names(&self, dir: &Path) -> io::Result<BTreeSet<String>> {
        match self.state().entries.get(dir) {
            Some(MockEntry::Dir(children)) => Ok(children.clone()),
            Some(MockEntry::File { .. }) => Err(io::Error::new(
                io::ErrorKind::NotADirectory,
                format!("{} is not a directory", dir.display()),
            )),
            None => Err(not_found(dir)),
        }
    }

    fn created(&self, path: &Path) -> io::Result<SystemTime> {
        match self.state().entries.get(path) {
            Some(MockEntry::File { created, .. }) => Ok(*created),
            Some(MockEntry::Dir(_)) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(not_found(path)),
        }
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        match self.state().entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(MockEntry::Dir(_)) => Ok(SystemTime::UNIX_EPOCH),
            None => Err(not_found(path)),
        }
    }

    fn probe_shared_read(&self, path: &Path) -> io::Result<()> {
        match self.state().entries.get(path) {
            Some(MockEntry::File { locked: false, .. }) => Ok(()),
            Some(MockEntry::File { locked: true, .. }) => Err(io::Error::new(
                io::ErrorKind::WouldBlock,
                format!("{} is locked by another writer", path.display()),
            )),
            Some(MockEntry::Dir(_)) => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a regular file", path.display()),
            )),
            None => Err(not_found(path)),
        }
    }
}
