// src/lib.rs

//! `inotools` turns the raw inotify event stream into a queryable watch set.
//!
//! - [`index`]: watches keyed by handle and by path
//! - [`reader`]: frames events out of partial reads, with filtering
//! - [`installer`]: single, bulk and recursive watch installation
//! - [`stats`]: per-watch and global event counters
//! - [`format`]: template rendering of events
//!
//! [`Inotools`] ties these together into one explicit session context.
//!
//! ```no_run
//! use inotools::{EventMask, Inotools};
//!
//! # fn main() -> inotools::Result<()> {
//! let mut session = Inotools::initialize()?;
//! session.watch_recursively("/tmp/project", EventMask::CREATE | EventMask::DELETE)?;
//! while let Some(event) = session.next_event(-1)? {
//!     println!("{}", session.format_event(&event, "%w%f %e")?);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod errors;
pub mod event;
pub mod format;
pub mod fs;
pub mod index;
pub mod installer;
pub mod limits;
pub mod logging;
pub mod reader;
pub mod session;
pub mod stats;
pub mod transport;
pub mod types;

pub use errors::{InotoolsError, Result};
pub use event::{
    event_to_str, event_to_str_sep, str_to_event, str_to_event_sep, EventKind, EventMask,
    EventRecord,
};
pub use index::{Watch, WatchIndex};
pub use reader::{ReaderState, MAX_EVENTS};
pub use session::Inotools;
pub use types::{Timeout, WatchHandle};
