//! The event store facade and its traits.
//!
//! [`EventStore`] is the surface external callers use: insert, remove all
//! events of a type, and query a type over a timestamp range. Queries hand
//! back an [`EventIterator`], a stateful cursor the caller drives.
//!
//! [`ConcurrentEventStore`] implements both traits over a shared
//! [`OrderedEventIndex`]. Cloning the store is cheap and every clone sees
//! the same events, so one instance can be handed to many threads.

use std::sync::Arc;

use tideline_types::Event;
use tracing::debug;

use crate::config::StoreConfig;
use crate::cursor::TypeFilteredCursor;
use crate::error::StoreError;
use crate::index::OrderedEventIndex;

/// A stateful cursor over the events matched by a query.
///
/// Call [`move_next`] before reading; it returns `false` once there are no
/// more matches.
///
/// [`move_next`]: EventIterator::move_next
pub trait EventIterator {
    /// Advance to the next matching event. Returns `false` at the end.
    fn move_next(&mut self) -> bool;

    /// The event at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] before the first successful
    /// `move_next` or after it has returned `false`.
    fn current(&self) -> Result<&Event, StoreError>;

    /// Remove the entry at the current position's timestamp from the store.
    ///
    /// Returns whether an entry was actually deleted; `false` means the
    /// key was already gone.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`current`](EventIterator::current).
    fn remove(&mut self) -> Result<bool, StoreError>;

    /// Release any resources held by the cursor. Safe to call repeatedly.
    fn close(&mut self);
}

/// A store of typed, timestamped events.
pub trait EventStore {
    /// The cursor type returned by [`query`](EventStore::query).
    type Cursor: EventIterator;

    /// Store `event`, replacing any event with the same timestamp.
    fn insert(&self, event: Event);

    /// Remove every event of the given type.
    fn remove_all(&self, event_type: &str);

    /// Query events of `event_type` with `start <= timestamp < end`.
    ///
    /// Returns immediately; matching happens as the cursor is advanced.
    fn query(&self, event_type: &str, start: i64, end: i64) -> Self::Cursor;
}

/// Thread-safe in-memory event store.
#[derive(Debug, Clone)]
pub struct ConcurrentEventStore {
    index: Arc<OrderedEventIndex>,
    config: StoreConfig,
}

impl Default for ConcurrentEventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConcurrentEventStore {
    /// Create an empty store with default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with the given configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            index: Arc::new(OrderedEventIndex::new()),
            config,
        }
    }

    /// The configuration this store was built with.
    pub const fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Number of events currently stored.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl EventStore for ConcurrentEventStore {
    type Cursor = TypeFilteredCursor;

    fn insert(&self, event: Event) {
        if let Some(displaced) = self.index.insert(event) {
            debug!(
                timestamp = displaced.timestamp(),
                displaced_type = displaced.event_type(),
                "event overwritten"
            );
        }
    }

    fn remove_all(&self, event_type: &str) {
        let removed = self
            .index
            .remove_by_predicate(|event| event.is_type(event_type));
        debug!(event_type, removed, "removed all events of type");
    }

    fn query(&self, event_type: &str, start: i64, end: i64) -> Self::Cursor {
        let range = self
            .index
            .range_cursor(start, end, self.config.cursor_batch_size);
        TypeFilteredCursor::new(range, event_type)
    }
}

impl EventIterator for TypeFilteredCursor {
    fn move_next(&mut self) -> bool {
        Self::move_next(self)
    }

    fn current(&self) -> Result<&Event, StoreError> {
        Self::current(self)
    }

    fn remove(&mut self) -> Result<bool, StoreError> {
        Self::remove(self)
    }

    fn close(&mut self) {
        Self::close(self);
    }
}
