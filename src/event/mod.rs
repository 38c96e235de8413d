// src/event/mod.rs

//! Event model: the event-kind vocabulary and decoded event records.

pub mod mask;
pub mod record;

pub use mask::{
    event_to_str, event_to_str_sep, str_to_event, str_to_event_sep, EventKind, EventMask,
};
pub use record::{EventRecord, RawHeader, HEADER_LEN};
