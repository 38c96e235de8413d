// src/event/record.rs

//! Wire framing of a single inotify event.
//!
//! ```text
//! | wd: i32 | mask: u32 | cookie: u32 | len: u32 | name: [u8; len] |
//! ```
//!
//! All header fields are in native byte order. `name` is NUL-padded and only
//! present when the event concerns an entry inside a watched directory.

use crate::event::EventMask;
use crate::types::WatchHandle;

/// Size of the fixed header in bytes.
pub const HEADER_LEN: usize = 16;

/// Decoded fixed-size part of a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawHeader {
    pub handle: WatchHandle,
    pub mask: u32,
    pub cookie: u32,
    pub name_len: u32,
}

impl RawHeader {
    /// Decode a header from the start of `bytes`, if enough bytes are there.
    pub fn parse(bytes: &[u8]) -> Option<RawHeader> {
        let header = bytes.get(..HEADER_LEN)?;
        let field = |at: usize| -> [u8; 4] {
            [header[at], header[at + 1], header[at + 2], header[at + 3]]
        };
        Some(RawHeader {
            handle: i32::from_ne_bytes(field(0)),
            mask: u32::from_ne_bytes(field(4)),
            cookie: u32::from_ne_bytes(field(8)),
            name_len: u32::from_ne_bytes(field(12)),
        })
    }

    /// Total length of the frame this header starts.
    pub fn frame_len(&self) -> usize {
        HEADER_LEN + self.name_len as usize
    }
}

/// One event as surfaced to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Watch the event was reported on. `-1` for queue overflow.
    pub handle: WatchHandle,
    pub mask: EventMask,
    /// Links the `MOVED_FROM` and `MOVED_TO` halves of one rename.
    pub cookie: u32,
    /// Entry name inside the watched directory, when there is one.
    pub name: Option<String>,
}

impl EventRecord {
    /// Build a record from a parsed header and its trailing name bytes.
    ///
    /// `name_bytes` must be exactly `header.name_len` long.
    pub fn from_parts(header: RawHeader, name_bytes: &[u8]) -> EventRecord {
        let end = name_bytes
            .iter()
            .position(|b| *b == 0)
            .unwrap_or(name_bytes.len());
        let name = if end == 0 {
            None
        } else {
            Some(String::from_utf8_lossy(&name_bytes[..end]).into_owned())
        };

        EventRecord {
            handle: header.handle,
            mask: EventMask::from_bits_retain(header.mask),
            cookie: header.cookie,
            name,
        }
    }

    /// Name of the entry, or `""` when the event is on the watched object itself.
    pub fn name_or_empty(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn is_dir(&self) -> bool {
        self.mask.contains(EventMask::ISDIR)
    }
}
