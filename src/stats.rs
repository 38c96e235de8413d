// src/stats.rs

//! Per-watch and aggregate event counters.

use std::cmp::Ordering;

use crate::event::{EventKind, EventMask, EventRecord};
use crate::index::{Watch, WatchIndex};
use crate::types::WatchHandle;

/// One counter per elementary event kind plus a total.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventCounters {
    hits: [u64; EventKind::COUNT],
    total: u64,
}

impl EventCounters {
    /// Count one event carrying `mask`.
    ///
    /// Each elementary kind present in the mask is bumped, the total once.
    pub fn record(&mut self, mask: EventMask) {
        for kind in EventKind::iter_in(mask) {
            self.hits[kind.index()] += 1;
        }
        self.total += 1;
    }

    /// Counter selected by `mask`: the empty mask selects the total, a mask
    /// with exactly one elementary kind selects that kind. Anything else has
    /// no counter.
    pub fn get(&self, mask: EventMask) -> Option<u64> {
        if mask.is_empty() {
            return Some(self.total);
        }
        EventKind::from_mask(mask).map(|kind| self.hits[kind.index()])
    }

    pub fn kind(&self, kind: EventKind) -> u64 {
        self.hits[kind.index()]
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn reset(&mut self) {
        *self = EventCounters::default();
    }
}

#[derive(Debug, Default)]
pub struct StatsCollector {
    enabled: bool,
    global: EventCounters,
}

impl StatsCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable collection, zeroing the global counters and those of every
    /// indexed watch.
    pub fn start_or_reset(&mut self, index: &mut WatchIndex) {
        self.enabled = true;
        self.global.reset();
        for watch in index.iter_mut() {
            watch.counters_mut().reset();
        }
    }

    /// Account for a surfaced event. Events on a handle that is not indexed
    /// are not counted anywhere.
    pub fn record(&mut self, index: &mut WatchIndex, event: &EventRecord) {
        if !self.enabled {
            return;
        }
        let Some(watch) = index.find_by_handle_mut(event.handle) else {
            return;
        };
        watch.counters_mut().record(event.mask);
        self.global.record(event.mask);
    }

    /// Read a counter.
    ///
    /// `handle == None` reads the global counters. `None` is returned when
    /// collection is off, the watch is unknown or `mask` selects no counter.
    pub fn stat(
        &self,
        index: &WatchIndex,
        handle: Option<WatchHandle>,
        mask: EventMask,
    ) -> Option<u64> {
        if !self.enabled {
            return None;
        }
        match handle {
            None => self.global.get(mask),
            Some(handle) => index.find_by_handle(handle)?.counters().get(mask),
        }
    }

    /// All watches ordered by one counter (`kind == None` orders by total).
    ///
    /// Equal counters are ordered by ascending handle in both directions.
    pub fn sorted<'a>(
        &self,
        index: &'a WatchIndex,
        kind: Option<EventKind>,
        descending: bool,
    ) -> Option<Vec<&'a Watch>> {
        if !self.enabled {
            return None;
        }
        let counter = |w: &Watch| match kind {
            Some(kind) => w.counters().kind(kind),
            None => w.counters().total(),
        };

        let mut watches: Vec<&Watch> = index.iter().collect();
        watches.sort_by(|a, b| {
            let by_count = counter(a).cmp(&counter(b));
            let by_count = if descending {
                by_count.reverse()
            } else {
                by_count
            };
            match by_count {
                Ordering::Equal => a.handle().cmp(&b.handle()),
                other => other,
            }
        });
        Some(watches)
    }
}
