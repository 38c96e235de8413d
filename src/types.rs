// src/types.rs

use std::fmt;
use std::time::{Duration, Instant};

/// Watch descriptor handed out by the transport when a watch is created.
pub type WatchHandle = i32;

/// How long a read call may wait for the transport to become readable.
///
/// The integer convention used by config files and callers maps as:
/// `0` is a non-blocking poll, a negative value blocks indefinitely and a
/// positive value waits that many seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeout {
    NonBlocking,
    Forever,
    Seconds(u64),
}

impl Timeout {
    /// Poll timeout in milliseconds, `-1` meaning "no limit".
    pub fn as_millis(self) -> i32 {
        match self {
            Timeout::NonBlocking => 0,
            Timeout::Forever => -1,
            Timeout::Seconds(secs) => secs
                .saturating_mul(1000)
                .min(i32::MAX as u64) as i32,
        }
    }

    /// Instant at which a wait started now should give up.
    ///
    /// `None` means the wait never expires, which is also the answer for
    /// windows too long to represent as an `Instant`.
    pub fn deadline_from(self, start: Instant) -> Option<Instant> {
        match self {
            Timeout::NonBlocking => Some(start),
            Timeout::Forever => None,
            Timeout::Seconds(secs) => start.checked_add(Duration::from_secs(secs)),
        }
    }
}

impl From<i64> for Timeout {
    fn from(value: i64) -> Self {
        match value {
            0 => Timeout::NonBlocking,
            v if v < 0 => Timeout::Forever,
            v => Timeout::Seconds(v as u64),
        }
    }
}

impl From<i32> for Timeout {
    fn from(value: i32) -> Self {
        Timeout::from(value as i64)
    }
}

impl fmt::Display for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Timeout::NonBlocking => write!(f, "non-blocking"),
            Timeout::Forever => write!(f, "forever"),
            Timeout::Seconds(secs) => write!(f, "{secs}s"),
        }
    }
}
