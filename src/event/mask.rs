// src/event/mask.rs

//! Event-kind vocabulary and its string form.
//!
//! Bit values are the ones the kernel uses in `struct inotify_event`, so a
//! mask decoded off the wire can be used directly.

use bitflags::bitflags;

use crate::errors::{InotoolsError, Result};

bitflags! {
    /// Bitmask of event kinds, as carried by a watch request or an event.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    pub struct EventMask: u32 {
        const ACCESS = 0x0000_0001;
        const MODIFY = 0x0000_0002;
        const ATTRIB = 0x0000_0004;
        const CLOSE_WRITE = 0x0000_0008;
        const CLOSE_NOWRITE = 0x0000_0010;
        const OPEN = 0x0000_0020;
        const MOVED_FROM = 0x0000_0040;
        const MOVED_TO = 0x0000_0080;
        const CREATE = 0x0000_0100;
        const DELETE = 0x0000_0200;
        const DELETE_SELF = 0x0000_0400;
        const MOVE_SELF = 0x0000_0800;
        const UNMOUNT = 0x0000_2000;
        const Q_OVERFLOW = 0x0000_4000;
        const IGNORED = 0x0000_8000;

        const ONLYDIR = 0x0100_0000;
        const DONT_FOLLOW = 0x0200_0000;
        const EXCL_UNLINK = 0x0400_0000;
        const MASK_ADD = 0x2000_0000;
        const ISDIR = 0x4000_0000;
        const ONESHOT = 0x8000_0000;

        const CLOSE = Self::CLOSE_WRITE.bits() | Self::CLOSE_NOWRITE.bits();
        const MOVE = Self::MOVED_FROM.bits() | Self::MOVED_TO.bits();
        const ALL_EVENTS = Self::ACCESS.bits()
            | Self::MODIFY.bits()
            | Self::ATTRIB.bits()
            | Self::CLOSE_WRITE.bits()
            | Self::CLOSE_NOWRITE.bits()
            | Self::OPEN.bits()
            | Self::MOVED_FROM.bits()
            | Self::MOVED_TO.bits()
            | Self::CREATE.bits()
            | Self::DELETE.bits()
            | Self::DELETE_SELF.bits()
            | Self::MOVE_SELF.bits()
            | Self::UNMOUNT.bits()
            | Self::Q_OVERFLOW.bits()
            | Self::IGNORED.bits();
    }
}

/// One indivisible event kind.
///
/// Declaration order is the order names appear in rendered event lists and
/// the slot order of per-kind counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Access,
    Modify,
    Attrib,
    CloseWrite,
    CloseNowrite,
    Open,
    MovedFrom,
    MovedTo,
    Create,
    Delete,
    DeleteSelf,
    Unmount,
    QueueOverflow,
    Ignored,
    MoveSelf,
}

impl EventKind {
    pub const COUNT: usize = 15;

    pub const ALL: [EventKind; EventKind::COUNT] = [
        EventKind::Access,
        EventKind::Modify,
        EventKind::Attrib,
        EventKind::CloseWrite,
        EventKind::CloseNowrite,
        EventKind::Open,
        EventKind::MovedFrom,
        EventKind::MovedTo,
        EventKind::Create,
        EventKind::Delete,
        EventKind::DeleteSelf,
        EventKind::Unmount,
        EventKind::QueueOverflow,
        EventKind::Ignored,
        EventKind::MoveSelf,
    ];

    pub fn mask(self) -> EventMask {
        match self {
            EventKind::Access => EventMask::ACCESS,
            EventKind::Modify => EventMask::MODIFY,
            EventKind::Attrib => EventMask::ATTRIB,
            EventKind::CloseWrite => EventMask::CLOSE_WRITE,
            EventKind::CloseNowrite => EventMask::CLOSE_NOWRITE,
            EventKind::Open => EventMask::OPEN,
            EventKind::MovedFrom => EventMask::MOVED_FROM,
            EventKind::MovedTo => EventMask::MOVED_TO,
            EventKind::Create => EventMask::CREATE,
            EventKind::Delete => EventMask::DELETE,
            EventKind::DeleteSelf => EventMask::DELETE_SELF,
            EventKind::Unmount => EventMask::UNMOUNT,
            EventKind::QueueOverflow => EventMask::Q_OVERFLOW,
            EventKind::Ignored => EventMask::IGNORED,
            EventKind::MoveSelf => EventMask::MOVE_SELF,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::Access => "ACCESS",
            EventKind::Modify => "MODIFY",
            EventKind::Attrib => "ATTRIB",
            EventKind::CloseWrite => "CLOSE_WRITE",
            EventKind::CloseNowrite => "CLOSE_NOWRITE",
            EventKind::Open => "OPEN",
            EventKind::MovedFrom => "MOVED_FROM",
            EventKind::MovedTo => "MOVED_TO",
            EventKind::Create => "CREATE",
            EventKind::Delete => "DELETE",
            EventKind::DeleteSelf => "DELETE_SELF",
            EventKind::Unmount => "UNMOUNT",
            EventKind::QueueOverflow => "Q_OVERFLOW",
            EventKind::Ignored => "IGNORED",
            EventKind::MoveSelf => "MOVE_SELF",
        }
    }

    /// Slot of this kind in a counter array.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The kind whose bit is the *only* bit set in `mask`.
    ///
    /// Composite masks, flag bits and the empty mask yield `None`.
    pub fn from_mask(mask: EventMask) -> Option<EventKind> {
        EventKind::ALL.into_iter().find(|kind| kind.mask() == mask)
    }

    /// Every elementary kind present in `mask`, in declaration order.
    pub fn iter_in(mask: EventMask) -> impl Iterator<Item = EventKind> {
        EventKind::ALL
            .into_iter()
            .filter(move |kind| mask.contains(kind.mask()))
    }
}

/// Modifier bits that are rendered after the elementary kinds.
const FLAG_NAMES: [(EventMask, &str); 2] =
    [(EventMask::ISDIR, "ISDIR"), (EventMask::ONESHOT, "ONESHOT")];

/// Parse a comma-separated list of event names.
pub fn str_to_event(events: &str) -> Result<EventMask> {
    str_to_event_sep(events, ',')
}

/// Parse a list of event names separated by `sep`.
///
/// Names are case-insensitive. An empty input, or a list containing an empty
/// item (including a trailing separator), yields the empty mask. An
/// unrecognized name is `UnknownEvent`; a separator that could be part of an
/// event name is `InvalidArgument`.
pub fn str_to_event_sep(events: &str, sep: char) -> Result<EventMask> {
    if sep == '_' || sep.is_ascii_alphabetic() {
        return Err(InotoolsError::InvalidArgument(format!(
            "event separator {sep:?} must not be a letter or '_'"
        )));
    }

    if events.is_empty() {
        return Ok(EventMask::empty());
    }

    let mut mask = EventMask::empty();
    for token in events.split(sep) {
        if token.is_empty() {
            return Ok(EventMask::empty());
        }
        mask |= one_str_to_event(token)
            .ok_or_else(|| InotoolsError::UnknownEvent(token.to_string()))?;
    }
    Ok(mask)
}

fn one_str_to_event(token: &str) -> Option<EventMask> {
    let upper = token.to_ascii_uppercase();
    if let Some(kind) = EventKind::ALL.into_iter().find(|k| k.name() == upper) {
        return Some(kind.mask());
    }
    match upper.as_str() {
        "CLOSE" => Some(EventMask::CLOSE),
        "MOVE" => Some(EventMask::MOVE),
        "ALL_EVENTS" => Some(EventMask::ALL_EVENTS),
        "ISDIR" => Some(EventMask::ISDIR),
        "ONESHOT" => Some(EventMask::ONESHOT),
        _ => None,
    }
}

/// Render a mask as comma-separated event names.
pub fn event_to_str(mask: EventMask) -> String {
    event_to_str_sep(mask, ',')
}

/// Render a mask as event names separated by `sep`.
///
/// Only elementary kinds and the `ISDIR`/`ONESHOT` flags are named, so the
/// output parses back to the same set of bits. A mask with none of those
/// bits is rendered as `0x%08x`.
pub fn event_to_str_sep(mask: EventMask, sep: char) -> String {
    let names: Vec<&str> = EventKind::iter_in(mask)
        .map(EventKind::name)
        .chain(
            FLAG_NAMES
                .iter()
                .filter(|(flag, _)| mask.contains(*flag))
                .map(|(_, name)| *name),
        )
        .collect();

    if names.is_empty() {
        return format!("0x{:08x}", mask.bits());
    }
    names.join(&sep.to_string())
}
