// src/session.rs

//! The [`Inotools`] context: one notification session with its watch index,
//! statistics, event reader and formatting settings.
//!
//! Every operation fails with [`InotoolsError::NotInitialized`] once the
//! session has been cleaned up. The errno-style code of the most recent
//! failure is kept and can be read back with [`Inotools::last_error`].

use std::cell::Cell;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ConfigFile;
use crate::errors::{InotoolsError, Result};
use crate::event::{EventKind, EventMask, EventRecord};
use crate::format;
use crate::fs::FileSystem;
use crate::index::{Watch, WatchIndex};
use crate::installer::Installer;
use crate::reader::{EventReader, ReaderState};
use crate::stats::StatsCollector;
use crate::transport::Transport;
use crate::types::{Timeout, WatchHandle};

#[derive(Debug)]
struct Live {
    transport: Box<dyn Transport>,
    fs: Arc<dyn FileSystem>,
    index: WatchIndex,
    stats: StatsCollector,
    reader: EventReader,
    time_format: Option<String>,
}

impl Live {
    fn installer(&mut self) -> Installer<'_> {
        Installer::new(self.fs.as_ref(), self.transport.as_ref(), &mut self.index)
    }
}

#[derive(Debug)]
pub struct Inotools {
    live: Option<Live>,
    last_error: Cell<i32>,
}

impl Inotools {
    /// Open a session on the kernel's inotify interface.
    #[cfg(target_os = "linux")]
    pub fn initialize() -> Result<Self> {
        let transport = crate::transport::InotifyTransport::open()?;
        Ok(Self::with_transport(transport, crate::fs::RealFileSystem))
    }

    /// Open a session over an arbitrary transport and filesystem.
    pub fn with_transport(
        transport: impl Transport + 'static,
        fs: impl FileSystem + 'static,
    ) -> Self {
        info!("inotools session initialized");
        Self {
            live: Some(Live {
                transport: Box::new(transport),
                fs: Arc::new(fs),
                index: WatchIndex::new(),
                stats: StatsCollector::new(),
                reader: EventReader::new(),
                time_format: None,
            }),
            last_error: Cell::new(0),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.live.is_some()
    }

    /// Close the transport and forget all watches, counters and settings.
    ///
    /// Calling it again is a no-op.
    pub fn cleanup(&mut self) {
        let Some(mut live) = self.live.take() else {
            return;
        };
        if let Err(e) = live.transport.close() {
            warn!(error = %e, "failed to close transport during cleanup");
        }
        debug!(watches = live.index.count(), "inotools session cleaned up");
    }

    /// errno-style code of the last failed call, `0` if it succeeded.
    pub fn last_error(&self) -> i32 {
        self.last_error.get()
    }

    fn live(&self) -> Result<&Live> {
        self.last_error.set(0);
        self.live.as_ref().ok_or(InotoolsError::NotInitialized)
    }

    fn live_mut(&mut self) -> Result<&mut Live> {
        self.last_error.set(0);
        self.live.as_mut().ok_or(InotoolsError::NotInitialized)
    }

    fn track<T>(&self, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            self.last_error.set(e.code());
        }
        result
    }

    // Watch installation and removal.

    pub fn watch_file(&mut self, path: &str, mask: EventMask) -> Result<()> {
        let result = self
            .live_mut()
            .and_then(|live| live.installer().watch_file(path, mask));
        self.track(result)
    }

    pub fn watch_files<S: AsRef<str>>(&mut self, paths: &[S], mask: EventMask) -> Result<()> {
        let result = self
            .live_mut()
            .and_then(|live| live.installer().watch_files(paths, mask));
        self.track(result)
    }

    pub fn watch_recursively(&mut self, path: &str, mask: EventMask) -> Result<()> {
        self.watch_recursively_with_exclude(path, mask, &[])
    }

    pub fn watch_recursively_with_exclude(
        &mut self,
        path: &str,
        mask: EventMask,
        exclude: &[String],
    ) -> Result<()> {
        let result = self
            .live_mut()
            .and_then(|live| live.installer().watch_tree(path, mask, exclude));
        self.track(result)
    }

    /// Stop watching `handle`. An unknown handle is not an error.
    ///
    /// If the transport refuses, the watch stays indexed.
    pub fn remove_watch_by_handle(&mut self, handle: WatchHandle) -> Result<()> {
        let result = self.live_mut().and_then(|live| {
            if live.index.find_by_handle(handle).is_none() {
                return Ok(());
            }
            live.transport.remove_watch(handle)?;
            live.index.remove(handle);
            debug!(handle, "watch removed");
            Ok(())
        });
        self.track(result)
    }

    /// Stop watching the watch established on `path`. An unknown path is
    /// not an error.
    pub fn remove_watch_by_path(&mut self, path: &str) -> Result<()> {
        let handle = match self.live() {
            Ok(live) => live.index.find_by_path(path).map(Watch::handle),
            Err(e) => return self.track(Err(e)),
        };
        match handle {
            Some(handle) => self.remove_watch_by_handle(handle),
            None => Ok(()),
        }
    }

    // Lookups and renames.

    pub fn path_from_handle(&self, handle: WatchHandle) -> Result<Option<&str>> {
        let result = self
            .live()
            .map(|live| live.index.find_by_handle(handle).map(Watch::path));
        self.track(result)
    }

    pub fn handle_from_path(&self, path: &str) -> Result<Option<WatchHandle>> {
        let result = self
            .live()
            .map(|live| live.index.find_by_path(path).map(Watch::handle));
        self.track(result)
    }

    pub fn num_watches(&self) -> Result<usize> {
        let result = self.live().map(|live| live.index.count());
        self.track(result)
    }

    /// Snapshot of all watches in handle order.
    pub fn watches(&self) -> Result<Vec<Watch>> {
        let result = self
            .live()
            .map(|live| live.index.iter().cloned().collect());
        self.track(result)
    }

    /// Record that the object watched through `handle` now lives at `new_path`.
    pub fn set_path_by_handle(&mut self, handle: WatchHandle, new_path: &str) -> Result<bool> {
        let result = self
            .live_mut()
            .map(|live| live.index.set_path(handle, new_path));
        self.track(result)
    }

    /// Record that the object watched at `old_path` now lives at `new_path`.
    pub fn set_path_by_path(&mut self, old_path: &str, new_path: &str) -> Result<bool> {
        let result = self
            .live_mut()
            .map(|live| live.index.rename(old_path, new_path));
        self.track(result)
    }

    /// Record that everything under `old_prefix` moved under `new_prefix`.
    pub fn replace_path_prefix(&mut self, old_prefix: &str, new_prefix: &str) -> Result<usize> {
        let result = self
            .live_mut()
            .map(|live| live.index.rename_prefix(old_prefix, new_prefix));
        self.track(result)
    }

    // Statistics.

    /// Enable statistics, or zero every counter if already enabled.
    pub fn initialize_stats(&mut self) -> Result<()> {
        let result = self.live_mut().map(|live| {
            live.stats.start_or_reset(&mut live.index);
        });
        self.track(result)
    }

    /// Counter of one watch. An empty `mask` selects the total.
    ///
    /// `None` when statistics are off, the watch is unknown or `mask` is not
    /// a single event kind.
    pub fn stat_by_handle(&self, handle: WatchHandle, mask: EventMask) -> Result<Option<u64>> {
        let result = self
            .live()
            .map(|live| live.stats.stat(&live.index, Some(handle), mask));
        self.track(result)
    }

    pub fn stat_by_path(&self, path: &str, mask: EventMask) -> Result<Option<u64>> {
        let result = self.live().map(|live| {
            let handle = live.index.find_by_path(path).map(Watch::handle)?;
            live.stats.stat(&live.index, Some(handle), mask)
        });
        self.track(result)
    }

    /// Counter over all watches.
    pub fn stat_total(&self, mask: EventMask) -> Result<Option<u64>> {
        let result = self
            .live()
            .map(|live| live.stats.stat(&live.index, None, mask));
        self.track(result)
    }

    /// Watches ordered by the counter of `kind` (`None` orders by total).
    pub fn watches_sorted_by_event(
        &self,
        kind: Option<EventKind>,
        descending: bool,
    ) -> Result<Option<Vec<Watch>>> {
        let result = self.live().map(|live| {
            live.stats
                .sorted(&live.index, kind, descending)
                .map(|watches| watches.into_iter().cloned().collect())
        });
        self.track(result)
    }

    // Reading events.

    /// Next event, waiting at most `timeout`. `Ok(None)` on timeout.
    pub fn next_event(&mut self, timeout: impl Into<Timeout>) -> Result<Option<EventRecord>> {
        self.next_events(timeout, 1)
    }

    /// Next event, letting about `batch` events queue up before reading.
    pub fn next_events(
        &mut self,
        timeout: impl Into<Timeout>,
        batch: usize,
    ) -> Result<Option<EventRecord>> {
        let timeout = timeout.into();
        let result = self.live_mut().and_then(|live| {
            live.reader.next_event(
                live.transport.as_ref(),
                &mut live.index,
                &mut live.stats,
                timeout,
                batch,
            )
        });
        self.track(result)
    }

    /// Drop events whose watched path plus entry name matches `pattern`.
    ///
    /// `None` removes the filter. An invalid pattern also leaves no filter
    /// installed.
    pub fn ignore_events_by_regex(&mut self, pattern: Option<&str>) -> Result<()> {
        let result = self.live_mut().and_then(|live| {
            live.reader.set_filter(None);
            let Some(pattern) = pattern else {
                return Ok(());
            };
            let regex = Regex::new(pattern).map_err(|e| {
                InotoolsError::InvalidArgument(format!("invalid ignore pattern: {e}"))
            })?;
            live.reader.set_filter(Some(regex));
            Ok(())
        });
        self.track(result)
    }

    pub fn reader_state(&self) -> Result<ReaderState> {
        let result = self.live().map(|live| live.reader.state());
        self.track(result)
    }

    // Formatting.

    /// strftime-style format used for `%T`. `None` renders `%T` as nothing.
    pub fn set_time_format(&mut self, time_format: Option<&str>) -> Result<()> {
        let result = self.live_mut().map(|live| {
            live.time_format = time_format.map(str::to_string);
        });
        self.track(result)
    }

    pub fn format_event(&self, event: &EventRecord, template: &str) -> Result<String> {
        self.format_event_bounded(event, template, format::MAX_STRLEN)
    }

    pub fn format_event_bounded(
        &self,
        event: &EventRecord,
        template: &str,
        capacity: usize,
    ) -> Result<String> {
        let result = self.live().and_then(|live| {
            let watched = live.index.find_by_handle(event.handle).map(Watch::path);
            format::format_event_bounded(
                event,
                watched,
                template,
                live.time_format.as_deref(),
                capacity,
            )
        });
        self.track(result)
    }

    // Configuration.

    /// Install the watches, filter, time format and statistics a validated
    /// configuration describes.
    pub fn apply_config(&mut self, cfg: &ConfigFile) -> Result<()> {
        if cfg.stats_enabled {
            self.initialize_stats()?;
        }
        self.ignore_events_by_regex(cfg.ignore_regex.as_deref())?;
        self.set_time_format(cfg.time_format.as_deref())?;

        for path in &cfg.paths {
            if cfg.recursive {
                self.watch_recursively_with_exclude(path, cfg.mask, &cfg.exclude)?;
            } else {
                self.watch_file(path, cfg.mask)?;
            }
        }
        info!(
            paths = cfg.paths.len(),
            watches = self.num_watches()?,
            "configuration applied"
        );
        Ok(())
    }

    /// Next event using the `[reader]` timeout and batch size of `cfg`.
    pub fn next_configured_event(&mut self, cfg: &ConfigFile) -> Result<Option<EventRecord>> {
        self.next_events(cfg.timeout, cfg.batch_size)
    }

    /// Render `event` with the `[format]` template of `cfg`.
    pub fn format_configured(&self, event: &EventRecord, cfg: &ConfigFile) -> Result<String> {
        self.format_event(event, &cfg.template)
    }
}

impl Drop for Inotools {
    fn drop(&mut self) {
        self.cleanup();
    }
}
