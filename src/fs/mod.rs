// src/fs/mod.rs

use std::fmt::Debug;
use std::fs;
use std::io;

pub mod mock;

/// What a path names, without following a final symbolic link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Directory,
    Symlink,
    File,
    Other,
}

/// Directory access used while installing watches.
pub trait FileSystem: Send + Sync + Debug {
    /// Names of the entries in a directory, without `.` and `..`.
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>>;

    /// `lstat`-style lookup: a symbolic link reports [`EntryKind::Symlink`].
    fn entry_kind(&self, path: &str) -> io::Result<EntryKind>;

    /// Whether `path` is a real directory. Symbolic links and lookup
    /// failures answer `false`.
    fn is_dir(&self, path: &str) -> bool {
        matches!(self.entry_kind(path), Ok(EntryKind::Directory))
    }
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_dir(&self, path: &str) -> io::Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(names)
    }

    fn entry_kind(&self, path: &str) -> io::Result<EntryKind> {
        let file_type = fs::symlink_metadata(path)?.file_type();
        let kind = if file_type.is_symlink() {
            EntryKind::Symlink
        } else if file_type.is_dir() {
            EntryKind::Directory
        } else if file_type.is_file() {
            EntryKind::File
        } else {
            EntryKind::Other
        };
        Ok(kind)
    }
}
