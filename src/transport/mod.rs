// src/transport/mod.rs

//! Access to the kernel change-notification device.
//!
//! Everything above this module talks to a [`Transport`], so the reader and
//! the installer can be driven by [`mock::MockTransport`] in tests.

use std::fmt::Debug;
use std::io;

use crate::event::EventMask;
use crate::types::{Timeout, WatchHandle};

#[cfg(target_os = "linux")]
pub mod inotify;
pub mod mock;

#[cfg(target_os = "linux")]
pub use inotify::InotifyTransport;
pub use mock::MockTransport;

/// Outcome of waiting for the transport to become readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
}

/// An open notification session.
pub trait Transport: Send + Debug {
    /// Start watching `path` for the kinds in `mask`.
    fn add_watch(&self, path: &str, mask: EventMask) -> io::Result<WatchHandle>;

    fn remove_watch(&self, handle: WatchHandle) -> io::Result<()>;

    /// Block until there is something to read or `timeout` runs out.
    fn wait_readable(&self, timeout: Timeout) -> io::Result<Readiness>;

    /// Number of bytes that a read would return right now.
    fn bytes_available(&self) -> io::Result<usize>;

    /// Read raw event bytes. `Ok(0)` means the stream has ended.
    fn read(&self, buf: &mut [u8]) -> io::Result<usize>;

    /// Release the session. Later calls fail with `EBADF`.
    fn close(&mut self) -> io::Result<()>;
}
