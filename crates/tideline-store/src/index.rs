//! The ordered event index: a concurrent sorted map keyed by timestamp.
//!
//! [`OrderedEventIndex`] holds at most one [`Event`] per timestamp. It is
//! safe to share between threads behind an [`Arc`]; every method takes
//! `&self` and synchronizes internally.
//!
//! # Design
//!
//! - **Upsert**: inserting an existing timestamp replaces the stored event.
//! - **Short critical sections**: the map sits behind a reader/writer lock
//!   that is only held for a single lookup, a single mutation, or one
//!   bounded batch of a scan. No lock is ever held across calls.
//! - **Weakly-consistent scans**: [`RangeCursor`] and
//!   [`OrderedEventIndex::remove_by_predicate`] re-seek from the last key
//!   they saw, so they never revisit a key and never skip one that stayed
//!   present, but they may or may not see concurrent writes.

use std::collections::{BTreeMap, VecDeque};
use std::ops::Bound;
use std::sync::Arc;

use parking_lot::RwLock;
use tideline_types::Event;

/// Number of entries examined per read-lock acquisition when scanning for
/// bulk removal.
const REMOVAL_SCAN_CHUNK: usize = 256;

/// Concurrent ordered map from timestamp to [`Event`].
#[derive(Debug, Default)]
pub struct OrderedEventIndex {
    /// Events keyed by timestamp, ascending.
    entries: RwLock<BTreeMap<i64, Arc<Event>>>,
}

impl OrderedEventIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the number of stored events.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Return whether the index holds no events.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Upsert `event` under its timestamp.
    ///
    /// Returns the event previously stored under that timestamp, if any.
    pub fn insert(&self, event: Event) -> Option<Arc<Event>> {
        let timestamp = event.timestamp();
        let entry = Arc::new(event);
        self.entries.write().insert(timestamp, entry)
    }

    /// Remove whatever event is stored under `timestamp`.
    ///
    /// Returns the removed event, or `None` if the key was absent.
    pub fn remove(&self, timestamp: i64) -> Option<Arc<Event>> {
        self.entries.write().remove(&timestamp)
    }

    /// Remove every visible entry whose event satisfies `predicate`.
    ///
    /// The scan walks the key space in ascending chunks. Candidates found
    /// under the read lock are re-checked under the write lock before
    /// removal, so an entry overwritten by a non-matching event in between
    /// is kept. Entries inserted behind the scan position are not visited.
    ///
    /// `predicate` runs while the index lock is held and must not call
    /// back into this index.
    ///
    /// Returns the number of entries removed.
    pub fn remove_by_predicate<P>(&self, predicate: P) -> usize
    where
        P: Fn(&Event) -> bool,
    {
        let mut after = Bound::Unbounded;
        let mut removed = 0_usize;

        loop {
            let mut candidates = Vec::new();
            let mut last_seen = None;
            {
                let entries = self.entries.read();
                for (&timestamp, event) in entries
                    .range((after, Bound::Unbounded))
                    .take(REMOVAL_SCAN_CHUNK)
                {
                    last_seen = Some(timestamp);
                    if predicate(event) {
                        candidates.push(timestamp);
                    }
                }
            }

            let Some(last) = last_seen else {
                break;
            };

            if !candidates.is_empty() {
                let mut entries = self.entries.write();
                for timestamp in candidates {
                    if entries.get(&timestamp).is_some_and(|event| predicate(event)) {
                        entries.remove(&timestamp);
                        removed = removed.saturating_add(1);
                    }
                }
            }

            after = Bound::Excluded(last);
        }

        removed
    }

    /// Open a cursor over timestamps in `[start, end)`, ascending.
    ///
    /// A degenerate range (`start >= end`) yields an empty cursor. The
    /// cursor buffers at most `batch_size` entries per refill; a batch size
    /// of zero is treated as one.
    pub fn range_cursor(self: &Arc<Self>, start: i64, end: i64, batch_size: usize) -> RangeCursor {
        RangeCursor {
            index: Arc::clone(self),
            next_from: Bound::Included(start),
            end,
            batch_size: batch_size.max(1),
            buffer: VecDeque::new(),
            drained: start >= end,
        }
    }
}

/// Weakly-consistent ascending cursor over a timestamp range of an
/// [`OrderedEventIndex`].
///
/// Holds no lock between calls. Each refill takes the read lock once,
/// copies up to `batch_size` entries following the last key seen, and
/// releases it. Entries are yielded in strictly ascending key order.
#[derive(Debug)]
pub struct RangeCursor {
    index: Arc<OrderedEventIndex>,
    /// Lower bound of the next refill.
    next_from: Bound<i64>,
    /// Exclusive upper bound of the range.
    end: i64,
    batch_size: usize,
    /// Entries fetched but not yet yielded.
    buffer: VecDeque<Arc<Event>>,
    /// Set once a refill comes back empty or the cursor is released.
    drained: bool,
}

impl RangeCursor {
    /// Return the next entry in the range, or `None` once exhausted.
    pub fn next_event(&mut self) -> Option<Arc<Event>> {
        if self.buffer.is_empty() {
            self.refill();
        }
        self.buffer.pop_front()
    }

    /// Remove whatever the backing index stores under `timestamp`.
    pub fn remove_at(&self, timestamp: i64) -> Option<Arc<Event>> {
        self.index.remove(timestamp)
    }

    /// Drop any buffered entries and stop yielding.
    ///
    /// Safe to call more than once. The backing index is untouched.
    pub fn release(&mut self) {
        self.buffer = VecDeque::new();
        self.drained = true;
    }

    fn refill(&mut self) {
        if self.drained {
            return;
        }
        // A key at or past `end` can only come from a misuse of bounds;
        // BTreeMap::range panics on an inverted range.
        if let Bound::Excluded(last) | Bound::Included(last) = self.next_from {
            if last >= self.end {
                self.drained = true;
                return;
            }
        }

        {
            let entries = self.index.entries.read();
            self.buffer.extend(
                entries
                    .range((self.next_from, Bound::Excluded(self.end)))
                    .take(self.batch_size)
                    .map(|(_, event)| Arc::clone(event)),
            );
        }

        match self.buffer.back() {
            Some(last) => self.next_from = Bound::Excluded(last.timestamp()),
            None => self.drained = true,
        }
    }
}

impl Iterator for RangeCursor {
    type Item = Arc<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}
