// src/installer.rs

//! Establishes watches and records them in the index.

use std::io;

use tracing::{debug, warn};

use crate::errors::Result;
use crate::event::EventMask;
use crate::fs::{EntryKind, FileSystem};
use crate::index::WatchIndex;
use crate::transport::Transport;

/// Borrowed view of everything needed to add watches.
pub struct Installer<'a> {
    pub fs: &'a dyn FileSystem,
    pub transport: &'a dyn Transport,
    pub index: &'a mut WatchIndex,
}

/// Errors that skip one subtree instead of aborting a recursive walk:
/// access denied, the entry vanished mid-walk, or too many symbolic links.
fn is_tolerated(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::PermissionDenied | io::ErrorKind::NotFound
    ) || err.raw_os_error() == Some(libc::ELOOP)
}

fn with_trailing_slash(path: &str) -> String {
    if path.ends_with('/') {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

fn is_excluded(dir: &str, exclude: &[String]) -> bool {
    let dir = dir.strip_suffix('/').unwrap_or(dir);
    exclude
        .iter()
        .any(|entry| entry.strip_suffix('/').unwrap_or(entry) == dir)
}

impl<'a> Installer<'a> {
    pub fn new(
        fs: &'a dyn FileSystem,
        transport: &'a dyn Transport,
        index: &'a mut WatchIndex,
    ) -> Self {
        Self {
            fs,
            transport,
            index,
        }
    }

    /// Watch one file or directory. Directories are indexed with a
    /// trailing `/`.
    pub fn watch_file(&mut self, path: &str, mask: EventMask) -> Result<()> {
        let handle = self.transport.add_watch(path, mask)?;
        let indexed = if self.fs.is_dir(path) {
            with_trailing_slash(path)
        } else {
            path.to_string()
        };
        debug!(handle, path = %indexed, "watch added");
        self.index.insert(handle, indexed)?;
        Ok(())
    }

    /// Watch each path in turn, stopping at the first failure. Watches
    /// added before the failure are kept.
    pub fn watch_files<S: AsRef<str>>(&mut self, paths: &[S], mask: EventMask) -> Result<()> {
        for path in paths {
            self.watch_file(path.as_ref(), mask)?;
        }
        Ok(())
    }

    /// Watch `root` and every directory below it, skipping any directory
    /// listed in `exclude`.
    ///
    /// Symbolic links are never followed and plain files inside the tree get
    /// no watch of their own. The walk is not atomic: entries created or
    /// removed while it runs may be missed.
    pub fn watch_tree(&mut self, root: &str, mask: EventMask, exclude: &[String]) -> Result<()> {
        self.walk(root, mask, exclude).map_err(Into::into)
    }

    fn walk(&mut self, root: &str, mask: EventMask, exclude: &[String]) -> io::Result<()> {
        let mut names = match self.fs.read_dir(root) {
            Ok(names) => names,
            Err(e) if e.raw_os_error() == Some(libc::ENOTDIR) => {
                return self.add(root.to_string(), mask);
            }
            Err(e) => return Err(e),
        };
        names.sort();

        let dir = with_trailing_slash(root);
        for name in names.iter().filter(|n| *n != "." && *n != "..") {
            let entry = format!("{dir}{name}");
            let kind = match self.fs.entry_kind(&entry) {
                Ok(kind) => kind,
                Err(e) if is_tolerated(&e) => {
                    warn!(path = %entry, error = %e, "skipping entry that cannot be examined");
                    continue;
                }
                Err(e) => return Err(e),
            };
            if kind != EntryKind::Directory {
                continue;
            }

            let subdir = format!("{entry}/");
            if is_excluded(&subdir, exclude) {
                debug!(path = %subdir, "directory excluded from recursive watch");
                continue;
            }
            match self.walk(&subdir, mask, exclude) {
                Ok(()) => {}
                Err(e) if is_tolerated(&e) => {
                    warn!(path = %subdir, error = %e, "skipping subtree");
                }
                Err(e) => return Err(e),
            }
        }

        self.add(dir, mask)
    }

    fn add(&mut self, path: String, mask: EventMask) -> io::Result<()> {
        let handle = self.transport.add_watch(&path, mask)?;
        debug!(handle, path = %path, "watch added");
        // handles from the transport are positive and paths are non-empty
        if let Err(e) = self.index.insert(handle, path) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string()));
        }
        Ok(())
    }
}
