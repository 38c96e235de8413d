// src/limits.rs

//! System-wide inotify tunables, read from procfs.

use std::fs;
use std::path::Path;

use crate::errors::{InotoolsError, Result};

pub const MAX_QUEUED_EVENTS_PATH: &str = "/proc/sys/fs/inotify/max_queued_events";
pub const MAX_USER_INSTANCES_PATH: &str = "/proc/sys/fs/inotify/max_user_instances";
pub const MAX_USER_WATCHES_PATH: &str = "/proc/sys/fs/inotify/max_user_watches";

/// Read a single integer from a file such as a procfs tunable.
pub fn read_num_from_file(path: impl AsRef<Path>) -> Result<u64> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    contents.trim().parse::<u64>().map_err(|e| {
        InotoolsError::InvalidArgument(format!(
            "{} does not hold an integer: {e}",
            path.display()
        ))
    })
}

/// Events that can be queued on one instance before overflow.
pub fn max_queued_events() -> Result<u64> {
    read_num_from_file(MAX_QUEUED_EVENTS_PATH)
}

pub fn max_user_instances() -> Result<u64> {
    read_num_from_file(MAX_USER_INSTANCES_PATH)
}

pub fn max_user_watches() -> Result<u64> {
    read_num_from_file(MAX_USER_WATCHES_PATH)
}
