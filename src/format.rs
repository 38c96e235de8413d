// src/format.rs

//! Template rendering of events.
//!
//! | token  | expands to                                         |
//! |--------|----------------------------------------------------|
//! | `%w`   | path of the watch the event arrived on             |
//! | `%f`   | entry name inside the watched directory, or empty  |
//! | `%e`   | event names separated by `,`                       |
//! | `%Xe`  | event names separated by the character `X`         |
//! | `%T`   | current local time in the configured time format   |
//! | `%%`   | a literal `%`                                      |
//!
//! Any other `%x` pair is copied to the output unchanged.

use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::errors::{InotoolsError, Result};
use crate::event::{event_to_str, event_to_str_sep, EventRecord};

/// Longest accepted template and largest output capacity, in bytes.
pub const MAX_STRLEN: usize = 4096;

/// Render `event` with `template`, producing at most [`MAX_STRLEN`] bytes.
pub fn format_event(
    event: &EventRecord,
    watched: Option<&str>,
    template: &str,
    time_format: Option<&str>,
) -> Result<String> {
    format_event_bounded(event, watched, template, time_format, MAX_STRLEN)
}

/// Render `event` with `template`, producing at most `capacity` bytes.
pub fn format_event_bounded(
    event: &EventRecord,
    watched: Option<&str>,
    template: &str,
    time_format: Option<&str>,
    capacity: usize,
) -> Result<String> {
    format_event_at(event, watched, template, time_format, capacity, Local::now())
}

/// Like [`format_event_bounded`] with `%T` rendered for `now`.
pub fn format_event_at(
    event: &EventRecord,
    watched: Option<&str>,
    template: &str,
    time_format: Option<&str>,
    capacity: usize,
    now: DateTime<Local>,
) -> Result<String> {
    if template.is_empty() {
        return Err(InotoolsError::InvalidArgument(
            "format template must not be empty".to_string(),
        ));
    }
    if template.len() > MAX_STRLEN || capacity > MAX_STRLEN {
        return Err(InotoolsError::InvalidArgument(format!(
            "format template and output are limited to {MAX_STRLEN} bytes"
        )));
    }

    let mut out = Bounded::new(capacity);
    let mut chars = template.chars().peekable();
    while let Some(ch) = chars.next() {
        if out.is_full() {
            break;
        }
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let Some(token) = chars.next() else {
            return Err(InotoolsError::InvalidArgument(
                "format template ends with a lone '%'".to_string(),
            ));
        };
        match token {
            '%' => out.push('%'),
            'w' => out.push_str(watched.unwrap_or("")),
            'f' => out.push_str(event.name_or_empty()),
            'e' => out.push_str(&event_to_str(event.mask)),
            'T' => out.push_str(&render_time(time_format, now)?),
            sep if chars.peek() == Some(&'e') => {
                chars.next();
                out.push_str(&event_to_str_sep(event.mask, sep));
            }
            other => {
                out.push('%');
                out.push(other);
            }
        }
    }
    Ok(out.into_string())
}

/// Check that `fmt` is a strftime-style format chrono understands.
pub fn validate_time_format(fmt: &str) -> Result<()> {
    if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
        return Err(InotoolsError::InvalidArgument(format!(
            "time format {fmt:?} is not valid"
        )));
    }
    Ok(())
}

fn render_time(time_format: Option<&str>, now: DateTime<Local>) -> Result<String> {
    let Some(fmt) = time_format else {
        return Ok(String::new());
    };
    validate_time_format(fmt)?;
    let items: Vec<Item<'_>> = StrftimeItems::new(fmt).collect();
    let mut rendered = String::new();
    write!(rendered, "{}", now.format_with_items(items.into_iter())).map_err(|_| {
        InotoolsError::InvalidArgument(format!("time format {fmt:?} cannot be rendered"))
    })?;
    if rendered.is_empty() {
        return Err(InotoolsError::InvalidArgument(format!(
            "time format {fmt:?} renders to nothing"
        )));
    }
    Ok(rendered)
}

/// String that silently stops growing at a byte limit, never splitting a
/// character.
struct Bounded {
    buf: String,
    limit: usize,
}

impl Bounded {
    fn new(limit: usize) -> Self {
        Self {
            buf: String::with_capacity(limit),
            limit,
        }
    }

    fn is_full(&self) -> bool {
        self.buf.len() >= self.limit
    }

    fn push(&mut self, ch: char) {
        if self.buf.len() + ch.len_utf8() <= self.limit {
            self.buf.push(ch);
        } else {
            self.limit = self.buf.len();
        }
    }

    fn push_str(&mut self, s: &str) {
        let room = self.limit.saturating_sub(self.buf.len());
        if s.len() <= room {
            self.buf.push_str(s);
            return;
        }
        let mut end = room;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        self.buf.push_str(&s[..end]);
        self.limit = self.buf.len();
    }

    fn into_string(self) -> String {
        self.buf
    }
}
