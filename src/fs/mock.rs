// src/fs/mock.rs

use super::{EntryKind, FileSystem};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum MockEntry {
    File,
    Dir,
    Symlink,
}

#[derive(Debug, Default)]
struct MockTree {
    // Keys are normalized: no trailing '/' except for the root "/".
    entries: BTreeMap<String, MockEntry>,
    read_dir_failures: HashMap<String, i32>,
    lstat_failures: HashMap<String, i32>,
}

/// In-memory directory tree with injectable failures.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    tree: Arc<Mutex<MockTree>>,
}

fn normalize(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') {
        "/".to_string()
    } else {
        trimmed.to_string()
    }
}

fn parent_of(path: &str) -> Option<&str> {
    match path.rfind('/') {
        Some(0) if path.len() > 1 => Some("/"),
        Some(0) | None => None,
        Some(at) => Some(&path[..at]),
    }
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn tree(&self) -> MutexGuard<'_, MockTree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn insert(&self, path: &str, entry: MockEntry) {
        let path = normalize(path);
        let mut tree = self.tree();
        let mut parent = parent_of(&path);
        while let Some(dir) = parent {
            tree.entries
                .entry(dir.to_string())
                .or_insert(MockEntry::Dir);
            parent = parent_of(dir);
        }
        tree.entries.insert(path, entry);
    }

    /// Add a directory, creating missing parents.
    pub fn add_dir(&self, path: &str) {
        self.insert(path, MockEntry::Dir);
    }

    pub fn add_file(&self, path: &str) {
        self.insert(path, MockEntry::File);
    }

    /// Add a symbolic link. Its target is irrelevant: links are never followed.
    pub fn add_symlink(&self, path: &str) {
        self.insert(path, MockEntry::Symlink);
    }

    pub fn remove(&self, path: &str) {
        let path = normalize(path);
        let nested = format!("{path}/");
        self.tree()
            .entries
            .retain(|p, _| *p != path && !p.starts_with(&nested));
    }

    /// Make listing `path` fail with the given errno.
    pub fn fail_read_dir(&self, path: &str, errno: i32) {
        self.tree().read_dir_failures.insert(normalize(path), errno);
    }

    /// Make looking up `path` fail with the given errno.
    pub fn fail_lstat(&self, path: &str, errno: i32) {
        self.tree().lstat_failures.insert(normalize(path), errno);
    }
}

impl FileSystem for MockFileSystem {
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let path = normalize(path);
        let tree = self.tree();
        if let Some(errno) = tree.read_dir_failures.get(&path) {
            return Err(io::Error::from_raw_os_error(*errno));
        }
        match tree.entries.get(&path) {
            Some(MockEntry::Dir) => {}
            Some(_) => return Err(io::Error::from_raw_os_error(libc::ENOTDIR)),
            None => return Err(io::Error::from_raw_os_error(libc::ENOENT)),
        }
        let names = tree
            .entries
            .keys()
            .filter(|p| parent_of(p) == Some(path.as_str()))
            .filter_map(|p| p.rsplit('/').next())
            .map(str::to_string)
            .collect();
        Ok(names)
    }

    fn entry_kind(&self, path: &str) -> io::Result<EntryKind> {
        let path = normalize(path);
        let tree = self.tree();
        if let Some(errno) = tree.lstat_failures.get(&path) {
            return Err(io::Error::from_raw_os_error(*errno));
        }
        match tree.entries.get(&path) {
            Some(MockEntry::Dir) => Ok(EntryKind::Directory),
            Some(MockEntry::File) => Ok(EntryKind::File),
            Some(MockEntry::Symlink) => Ok(EntryKind::Symlink),
            None => Err(io::Error::from_raw_os_error(libc::ENOENT)),
        }
    }
}
