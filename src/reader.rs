// src/reader.rs

//! Turns the raw byte stream of a [`Transport`] into [`EventRecord`]s.
//!
//! A single transport read may end anywhere inside a frame. Whatever has not
//! been decoded yet stays in the buffer and is moved to its front before the
//! next read, so frames are only ever decoded from contiguous bytes.

use std::thread;
use std::time::{Duration, Instant};

use regex::Regex;
use tracing::{debug, error, trace};

use crate::errors::{InotoolsError, Result};
use crate::event::{EventRecord, RawHeader, HEADER_LEN};
use crate::index::WatchIndex;
use crate::stats::StatsCollector;
use crate::transport::{Readiness, Transport};
use crate::types::Timeout;

/// Largest batch a caller may ask for, in events.
pub const MAX_EVENTS: usize = 4096;

/// Capacity of the read buffer in bytes.
pub const BUFFER_CAPACITY: usize = MAX_EVENTS * HEADER_LEN;

const BATCH_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderState {
    /// Nothing buffered.
    Idle,
    /// Blocked on the transport.
    Waiting,
    /// Buffered bytes are being decoded.
    Draining,
}

#[derive(Debug)]
pub struct EventReader {
    buf: Box<[u8]>,
    /// Start of the next undecoded frame.
    offset: usize,
    /// Number of valid bytes in `buf`. Always `offset <= len`.
    len: usize,
    state: ReaderState,
    filter: Option<Regex>,
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}

impl EventReader {
    pub fn new() -> Self {
        Self {
            buf: vec![0u8; BUFFER_CAPACITY].into_boxed_slice(),
            offset: 0,
            len: 0,
            state: ReaderState::Idle,
            filter: None,
        }
    }

    pub fn state(&self) -> ReaderState {
        self.state
    }

    /// Bytes read from the transport but not yet returned as events.
    pub fn buffered(&self) -> usize {
        self.len - self.offset
    }

    /// Install or clear the pattern of events to drop.
    ///
    /// The pattern is matched against the watched path followed by the
    /// entry name.
    pub fn set_filter(&mut self, filter: Option<Regex>) {
        self.filter = filter;
    }

    pub fn filter(&self) -> Option<&Regex> {
        self.filter.as_ref()
    }

    /// Return the next event, waiting at most `timeout` for one to arrive.
    ///
    /// With `batch > 1`, once the transport is readable the call keeps waiting
    /// (within `timeout`) until roughly `batch` events are queued before
    /// reading. `Ok(None)` means the timeout ran out, or `batch` is zero.
    pub fn next_event(
        &mut self,
        transport: &dyn Transport,
        index: &mut WatchIndex,
        stats: &mut StatsCollector,
        timeout: Timeout,
        batch: usize,
    ) -> Result<Option<EventRecord>> {
        if batch > MAX_EVENTS {
            return Err(InotoolsError::InvalidArgument(format!(
                "batch size {batch} exceeds the maximum of {MAX_EVENTS} events"
            )));
        }
        if batch == 0 {
            return Ok(None);
        }

        loop {
            let event = match self.take_frame()? {
                Some(event) => event,
                None => {
                    if !self.fill(transport, timeout, batch)? {
                        return Ok(None);
                    }
                    continue;
                }
            };

            if self.is_filtered(index, &event) {
                trace!(handle = event.handle, "event dropped by ignore filter");
                continue;
            }

            stats.record(index, &event);
            return Ok(Some(event));
        }
    }

    fn is_filtered(&self, index: &WatchIndex, event: &EventRecord) -> bool {
        let Some(filter) = &self.filter else {
            return false;
        };
        let watched = index
            .find_by_handle(event.handle)
            .map(|w| w.path())
            .unwrap_or("");
        let display = format!("{watched}{}", event.name_or_empty());
        filter.is_match(&display)
    }

    /// Decode the frame at `offset` if all of its bytes are buffered.
    fn take_frame(&mut self) -> Result<Option<EventRecord>> {
        let pending = &self.buf[self.offset..self.len];
        let Some(header) = RawHeader::parse(pending) else {
            self.settle();
            return Ok(None);
        };

        let frame_len = header.frame_len();
        if frame_len > BUFFER_CAPACITY {
            // the stream cannot be resynchronised past this header
            self.offset = 0;
            self.len = 0;
            self.state = ReaderState::Idle;
            return Err(InotoolsError::IoError(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("event frame of {frame_len} bytes does not fit the read buffer"),
            )));
        }
        if pending.len() < frame_len {
            self.settle();
            return Ok(None);
        }

        let event = EventRecord::from_parts(header, &pending[HEADER_LEN..frame_len]);
        self.offset += frame_len;
        self.settle();
        Ok(Some(event))
    }

    fn settle(&mut self) {
        if self.offset == self.len {
            self.offset = 0;
            self.len = 0;
            self.state = ReaderState::Idle;
        } else {
            self.state = ReaderState::Draining;
        }
    }

    /// Move the undecoded tail to the front of the buffer.
    fn compact(&mut self) {
        if self.offset == 0 {
            return;
        }
        self.buf.copy_within(self.offset..self.len, 0);
        self.len -= self.offset;
        self.offset = 0;
    }

    /// Wait for the transport and append one read to the buffer.
    ///
    /// Returns `false` when `timeout` ran out first.
    fn fill(&mut self, transport: &dyn Transport, timeout: Timeout, batch: usize) -> Result<bool> {
        self.state = ReaderState::Waiting;
        let filled = self.read_more(transport, timeout, batch);
        if !matches!(filled, Ok(true)) {
            self.settle();
        }
        filled
    }

    fn read_more(
        &mut self,
        transport: &dyn Transport,
        timeout: Timeout,
        batch: usize,
    ) -> Result<bool> {
        if transport.wait_readable(timeout)? == Readiness::TimedOut {
            return Ok(false);
        }
        if batch > 1 {
            self.accumulate(transport, timeout, batch)?;
        }

        self.compact();
        let n = transport.read(&mut self.buf[self.len..])?;
        if n == 0 {
            error!("inotify returned end-of-file; the event queue probably overflowed");
            return Err(InotoolsError::StreamClosed);
        }
        self.len += n;
        trace!(bytes = n, buffered = self.len - self.offset, "read from transport");
        self.state = ReaderState::Draining;
        Ok(true)
    }

    /// Hold off reading until about `batch` events are queued or the
    /// timeout window closes.
    fn accumulate(&self, transport: &dyn Transport, timeout: Timeout, batch: usize) -> Result<()> {
        let wanted = batch * HEADER_LEN;
        let deadline = timeout.deadline_from(Instant::now());
        loop {
            let available = transport.bytes_available()?;
            if available >= wanted {
                return Ok(());
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                debug!(available, wanted, "batch window closed before batch filled");
                return Ok(());
            }
            thread::sleep(BATCH_POLL_INTERVAL);
        }
    }
}
