// src/transport/mock.rs

use std::collections::{BTreeMap, HashMap, VecDeque};
use std::io;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{Readiness, Transport};
use crate::event::EventMask;
use crate::types::{Timeout, WatchHandle};

/// One scripted result of a `read` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Bytes(Vec<u8>),
    /// The stream ends: the read returns zero bytes.
    Eof,
}

#[derive(Debug)]
struct MockState {
    next_handle: WatchHandle,
    watches: BTreeMap<String, (WatchHandle, EventMask)>,
    add_failures: HashMap<String, i32>,
    remove_failures: HashMap<WatchHandle, i32>,
    pending: VecDeque<Delivery>,
    wait_errors: VecDeque<i32>,
    read_errors: VecDeque<i32>,
    waits: Vec<Timeout>,
    reads: usize,
    closed: bool,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            next_handle: 1,
            watches: BTreeMap::new(),
            add_failures: HashMap::new(),
            remove_failures: HashMap::new(),
            pending: VecDeque::new(),
            wait_errors: VecDeque::new(),
            read_errors: VecDeque::new(),
            waits: Vec::new(),
            reads: 0,
            closed: false,
        }
    }
}

/// In-memory [`Transport`] with scripted reads and failures.
///
/// Clones share state, so a test can keep a handle to push bytes and
/// inspect calls after giving a clone to the session.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue bytes for the next read. Empty chunks are ignored.
    pub fn push_bytes(&self, bytes: impl Into<Vec<u8>>) {
        let bytes = bytes.into();
        if !bytes.is_empty() {
            self.state().pending.push_back(Delivery::Bytes(bytes));
        }
    }

    /// Queue an end-of-stream read.
    pub fn push_eof(&self) {
        self.state().pending.push_back(Delivery::Eof);
    }

    /// Make `add_watch(path, _)` fail with the given errno.
    pub fn fail_add(&self, path: impl Into<String>, errno: i32) {
        self.state().add_failures.insert(path.into(), errno);
    }

    /// Make `remove_watch(handle)` fail with the given errno.
    pub fn fail_remove(&self, handle: WatchHandle, errno: i32) {
        self.state().remove_failures.insert(handle, errno);
    }

    /// Make the next `wait_readable` fail with the given errno.
    pub fn fail_next_wait(&self, errno: i32) {
        self.state().wait_errors.push_back(errno);
    }

    /// Make the next `read` fail with the given errno.
    pub fn fail_next_read(&self, errno: i32) {
        self.state().read_errors.push_back(errno);
    }

    /// Handle the transport assigned to `path`, if it is watched.
    pub fn handle_of(&self, path: &str) -> Option<WatchHandle> {
        self.state().watches.get(path).map(|(handle, _)| *handle)
    }

    pub fn mask_of(&self, path: &str) -> Option<EventMask> {
        self.state().watches.get(path).map(|(_, mask)| *mask)
    }

    /// Paths currently watched, in sorted order.
    pub fn watched_paths(&self) -> Vec<String> {
        self.state().watches.keys().cloned().collect()
    }

    /// Timeouts passed to `wait_readable`, oldest first.
    pub fn waits(&self) -> Vec<Timeout> {
        self.state().waits.clone()
    }

    pub fn read_count(&self) -> usize {
        self.state().reads
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

fn os_error(errno: i32) -> io::Error {
    io::Error::from_raw_os_error(errno)
}

impl Transport for MockTransport {
    fn add_watch(&self, path: &str, mask: EventMask) -> io::Result<WatchHandle> {
        let mut state = self.state();
        if state.closed {
            return Err(os_error(libc::EBADF));
        }
        if let Some(errno) = state.add_failures.get(path) {
            return Err(os_error(*errno));
        }
        if let Some((handle, watched)) = state.watches.get_mut(path) {
            *watched = mask;
            return Ok(*handle);
        }
        let handle = state.next_handle;
        state.next_handle += 1;
        state.watches.insert(path.to_string(), (handle, mask));
        Ok(handle)
    }

    fn remove_watch(&self, handle: WatchHandle) -> io::Result<()> {
        let mut state = self.state();
        if state.closed {
            return Err(os_error(libc::EBADF));
        }
        if let Some(errno) = state.remove_failures.get(&handle) {
            return Err(os_error(*errno));
        }
        let before = state.watches.len();
        state.watches.retain(|_, (h, _)| *h != handle);
        if state.watches.len() == before {
            return Err(os_error(libc::EINVAL));
        }
        Ok(())
    }

    fn wait_readable(&self, timeout: Timeout) -> io::Result<Readiness> {
        let mut state = self.state();
        if state.closed {
            return Err(os_error(libc::EBADF));
        }
        state.waits.push(timeout);
        if let Some(errno) = state.wait_errors.pop_front() {
            return Err(os_error(errno));
        }
        if state.pending.is_empty() {
            Ok(Readiness::TimedOut)
        } else {
            Ok(Readiness::Ready)
        }
    }

    fn bytes_available(&self) -> io::Result<usize> {
        let state = self.state();
        if state.closed {
            return Err(os_error(libc::EBADF));
        }
        let available = state
            .pending
            .iter()
            .map_while(|delivery| match delivery {
                Delivery::Bytes(bytes) => Some(bytes.len()),
                Delivery::Eof => None,
            })
            .sum();
        Ok(available)
    }

    fn read(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut state = self.state();
        if state.closed {
            return Err(os_error(libc::EBADF));
        }
        state.reads += 1;
        if let Some(errno) = state.read_errors.pop_front() {
            return Err(os_error(errno));
        }
        match state.pending.pop_front() {
            None => Err(io::Error::from(io::ErrorKind::WouldBlock)),
            Some(Delivery::Eof) => Ok(0),
            Some(Delivery::Bytes(mut bytes)) => {
                let n = bytes.len().min(buf.len());
                buf[..n].copy_from_slice(&bytes[..n]);
                if n < bytes.len() {
                    state.pending.push_front(Delivery::Bytes(bytes.split_off(n)));
                }
                Ok(n)
            }
        }
    }

    fn close(&mut self) -> io::Result<()> {
        let mut state = self.state();
        state.closed = true;
        state.watches.clear();
        Ok(())
    }
}
