#![allow(dead_code)]

use inotools::event::{EventMask, HEADER_LEN};

/// Builder for raw inotify byte streams.
///
/// Names are NUL-terminated and padded to a multiple of the header size,
/// the way the kernel lays them out.
#[derive(Debug, Default, Clone)]
pub struct FrameBuilder {
    bytes: Vec<u8>,
}

impl FrameBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event on the watched object itself.
    pub fn event(self, handle: i32, mask: EventMask) -> Self {
        self.frame(handle, mask, 0, None)
    }

    /// Append an event on the entry `name` inside a watched directory.
    pub fn named(self, handle: i32, mask: EventMask, name: &str) -> Self {
        self.frame(handle, mask, 0, Some(name))
    }

    /// Append one fully specified frame.
    pub fn frame(mut self, handle: i32, mask: EventMask, cookie: u32, name: Option<&str>) -> Self {
        let name_bytes = name.map(padded_name).unwrap_or_default();
        self.bytes.extend_from_slice(&handle.to_ne_bytes());
        self.bytes.extend_from_slice(&mask.bits().to_ne_bytes());
        self.bytes.extend_from_slice(&cookie.to_ne_bytes());
        self.bytes
            .extend_from_slice(&(name_bytes.len() as u32).to_ne_bytes());
        self.bytes.extend_from_slice(&name_bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}

fn padded_name(name: &str) -> Vec<u8> {
    let mut bytes = name.as_bytes().to_vec();
    bytes.push(0);
    let padded = bytes.len().div_ceil(HEADER_LEN) * HEADER_LEN;
    bytes.resize(padded, 0);
    bytes
}

/// Split `bytes` at the given offsets. Offsets past the end are ignored.
pub fn split_at_offsets(bytes: &[u8], offsets: &[usize]) -> Vec<Vec<u8>> {
    let mut cuts: Vec<usize> = offsets
        .iter()
        .copied()
        .filter(|&at| at > 0 && at < bytes.len())
        .collect();
    cuts.sort_unstable();
    cuts.dedup();

    let mut chunks = Vec::with_capacity(cuts.len() + 1);
    let mut start = 0;
    for at in cuts {
        chunks.push(bytes[start..at].to_vec());
        start = at;
    }
    chunks.push(bytes[start..].to_vec());
    chunks
}
