// src/index.rs

//! Dual-key index of live watches.
//!
//! Every watch is reachable both by its transport handle and by the path it
//! was established with. The two maps always describe the same live set:
//! insert, remove and every rename variant update both of them together.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::errors::{InotoolsError, Result};
use crate::stats::EventCounters;
use crate::types::WatchHandle;

/// One actively monitored filesystem object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Watch {
    handle: WatchHandle,
    path: String,
    counters: EventCounters,
}

impl Watch {
    pub fn handle(&self) -> WatchHandle {
        self.handle
    }

    /// Path used to establish the watch. Directories end with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn counters(&self) -> &EventCounters {
        &self.counters
    }

    pub(crate) fn counters_mut(&mut self) -> &mut EventCounters {
        &mut self.counters
    }
}

#[derive(Debug, Default)]
pub struct WatchIndex {
    by_handle: BTreeMap<WatchHandle, Watch>,
    by_path: BTreeMap<String, WatchHandle>,
}

impl WatchIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index a new watch.
    ///
    /// A record already holding `handle` or `path` is replaced. When the
    /// handle is reused (the kernel hands back the same descriptor for an
    /// inode that is already watched) its counters are carried over.
    pub fn insert(&mut self, handle: WatchHandle, path: impl Into<String>) -> Result<&Watch> {
        let path = path.into();
        if handle <= 0 {
            return Err(InotoolsError::InvalidArgument(format!(
                "watch handle must be positive (got {handle})"
            )));
        }
        if path.is_empty() {
            return Err(InotoolsError::InvalidArgument(
                "watch path must not be empty".to_string(),
            ));
        }

        let counters = self
            .remove(handle)
            .map(|old| old.counters)
            .unwrap_or_default();
        if let Some(displaced) = self.remove_by_path(&path) {
            debug!(
                handle = displaced.handle,
                path = %displaced.path,
                "path re-watched under a new handle"
            );
        }

        self.by_path.insert(path.clone(), handle);
        let watch = self.by_handle.entry(handle).or_insert(Watch {
            handle,
            path,
            counters,
        });
        Ok(&*watch)
    }

    pub fn find_by_handle(&self, handle: WatchHandle) -> Option<&Watch> {
        self.by_handle.get(&handle)
    }

    pub fn find_by_path(&self, path: &str) -> Option<&Watch> {
        self.by_path
            .get(path)
            .and_then(|handle| self.by_handle.get(handle))
    }

    pub(crate) fn find_by_handle_mut(&mut self, handle: WatchHandle) -> Option<&mut Watch> {
        self.by_handle.get_mut(&handle)
    }

    /// Drop the watch with `handle`. Absent handles are a no-op.
    pub fn remove(&mut self, handle: WatchHandle) -> Option<Watch> {
        let watch = self.by_handle.remove(&handle)?;
        self.by_path.remove(&watch.path);
        Some(watch)
    }

    /// Drop the watch established on `path`. Absent paths are a no-op.
    pub fn remove_by_path(&mut self, path: &str) -> Option<Watch> {
        let handle = self.by_path.remove(path)?;
        self.by_handle.remove(&handle)
    }

    /// Give the watch currently at `old_path` the path `new_path`.
    ///
    /// Returns whether a watch was renamed.
    pub fn rename(&mut self, old_path: &str, new_path: &str) -> bool {
        match self.by_path.get(old_path) {
            Some(&handle) => self.set_path(handle, new_path),
            None => false,
        }
    }

    /// Give the watch with `handle` the path `new_path`.
    ///
    /// Another watch that already owns `new_path` is evicted from the index.
    pub fn set_path(&mut self, handle: WatchHandle, new_path: &str) -> bool {
        if new_path.is_empty() {
            return false;
        }
        let Some(old_path) = self.by_handle.get(&handle).map(|w| w.path.clone()) else {
            return false;
        };
        if old_path == new_path {
            return true;
        }

        self.evict_conflict(handle, new_path);
        self.by_path.remove(&old_path);
        self.by_path.insert(new_path.to_string(), handle);
        if let Some(watch) = self.by_handle.get_mut(&handle) {
            watch.path = new_path.to_string();
        }
        true
    }

    /// Rewrite the prefix `old_prefix` to `new_prefix` on every matching path,
    /// keeping the remainder of each path verbatim.
    ///
    /// A watch is left alone when its path already equals `new_prefix`, or
    /// when its rewritten path would be exactly `new_prefix`. Returns the
    /// number of renamed watches.
    pub fn rename_prefix(&mut self, old_prefix: &str, new_prefix: &str) -> usize {
        if old_prefix.is_empty() {
            return 0;
        }

        let rewrites: Vec<(WatchHandle, String, String)> = self
            .by_path
            .iter()
            .filter(|(path, _)| path.starts_with(old_prefix) && path.as_str() != new_prefix)
            .filter_map(|(path, &handle)| {
                let renamed = format!("{new_prefix}{}", &path[old_prefix.len()..]);
                (renamed != new_prefix).then(|| (handle, path.clone(), renamed))
            })
            .collect();

        for (_, old_path, _) in &rewrites {
            self.by_path.remove(old_path);
        }
        for (handle, _, new_path) in &rewrites {
            self.evict_conflict(*handle, new_path);
            self.by_path.insert(new_path.clone(), *handle);
            if let Some(watch) = self.by_handle.get_mut(handle) {
                watch.path = new_path.clone();
            }
        }

        debug!(
            old_prefix,
            new_prefix,
            renamed = rewrites.len(),
            "rewrote watch path prefix"
        );
        rewrites.len()
    }

    fn evict_conflict(&mut self, keeper: WatchHandle, path: &str) {
        let Some(&holder) = self.by_path.get(path) else {
            return;
        };
        if holder == keeper {
            return;
        }
        if let Some(evicted) = self.remove(holder) {
            warn!(
                handle = evicted.handle,
                path = %evicted.path,
                "watch evicted from index: its path was taken over by a rename"
            );
        }
    }

    pub fn count(&self) -> usize {
        self.by_handle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Watches in ascending handle order.
    pub fn iter(&self) -> impl Iterator<Item = &Watch> {
        self.by_handle.values()
    }

    /// Watches in byte-wise path order.
    pub fn iter_by_path(&self) -> impl Iterator<Item = &Watch> {
        self.by_path
            .values()
            .filter_map(|handle| self.by_handle.get(handle))
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Watch> {
        self.by_handle.values_mut()
    }

    pub fn clear(&mut self) {
        self.by_handle.clear();
        self.by_path.clear();
    }
}
