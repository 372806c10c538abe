//! Single-type view over a range of the index.
//!
//! [`TypeFilteredCursor`] drives a [`RangeCursor`] and stops only on events
//! of its target type. It follows an explicit state machine:
//!
//! ```text
//! NotStarted --move_next()--> Positioned --move_next()--> Positioned
//!      |                           |
//!      +-------move_next()---------+-------> Exhausted (terminal)
//! ```
//!
//! `current()` and `remove()` are only valid while `Positioned`.

use std::sync::Arc;

use tideline_types::Event;
use tracing::trace;

use crate::error::StoreError;
use crate::index::RangeCursor;

/// Position of a [`TypeFilteredCursor`] in its traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorState {
    /// `move_next()` has not been called yet.
    NotStarted,
    /// The cursor is on a matching event.
    Positioned,
    /// No further matches; terminal.
    Exhausted,
}

impl core::fmt::Display for CursorState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::NotStarted => "cursor has not been advanced",
            Self::Positioned => "cursor is positioned",
            Self::Exhausted => "cursor is exhausted",
        };
        f.write_str(name)
    }
}

/// Cursor yielding only events of one type from a timestamp range.
///
/// Matching is lazy: nothing is scanned until [`move_next`] is called.
/// The cursor holds no lock on the index; concurrent writers may or may
/// not be reflected in what it yields.
///
/// A cursor is owned by one caller at a time. It may be moved to another
/// thread but not shared.
///
/// [`move_next`]: TypeFilteredCursor::move_next
#[derive(Debug)]
pub struct TypeFilteredCursor {
    inner: RangeCursor,
    event_type: String,
    /// The matched event while `Positioned`.
    current: Option<Arc<Event>>,
    /// Set once `remove()` has deleted the current position.
    current_removed: bool,
    state: CursorState,
    closed: bool,
}

impl TypeFilteredCursor {
    /// Wrap `inner`, keeping only events whose type equals `event_type`.
    pub fn new(inner: RangeCursor, event_type: impl Into<String>) -> Self {
        Self {
            inner,
            event_type: event_type.into(),
            current: None,
            current_removed: false,
            state: CursorState::NotStarted,
            closed: false,
        }
    }

    /// The type this cursor filters on.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The cursor's current state.
    pub const fn state(&self) -> CursorState {
        self.state
    }

    /// Advance to the next event of the target type.
    ///
    /// Returns `false` once the range holds no further matches, and keeps
    /// returning `false` afterwards.
    pub fn move_next(&mut self) -> bool {
        if self.state == CursorState::Exhausted {
            return false;
        }
        self.current_removed = false;

        while let Some(event) = self.inner.next_event() {
            if event.is_type(&self.event_type) {
                self.current = Some(event);
                self.state = CursorState::Positioned;
                return true;
            }
        }

        self.current = None;
        self.state = CursorState::Exhausted;
        false
    }

    /// The event at the current position.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidState`] before the first successful
    /// [`move_next`](Self::move_next) or after it has returned `false`.
    pub fn current(&self) -> Result<&Event, StoreError> {
        self.positioned().map(AsRef::as_ref)
    }

    /// Shared handle to the event at the current position.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`current`](Self::current).
    pub fn current_shared(&self) -> Result<Arc<Event>, StoreError> {
        self.positioned().map(Arc::clone)
    }

    /// Delete the entry at the current position's timestamp from the index.
    ///
    /// Removal is by key: if the timestamp was overwritten after this
    /// cursor read it, the newer event is the one deleted. The removal is
    /// visible to every other reader immediately.
    ///
    /// Returns `true` if an entry was deleted, `false` if the key was
    /// already gone. After one successful removal, further calls at the
    /// same position return `false` without touching the index.
    /// [`current`](Self::current) keeps returning the read event until the
    /// cursor moves.
    ///
    /// # Errors
    ///
    /// Same preconditions as [`current`](Self::current).
    pub fn remove(&mut self) -> Result<bool, StoreError> {
        let timestamp = self.positioned()?.timestamp();
        if self.current_removed {
            return Ok(false);
        }
        let removed = self.inner.remove_at(timestamp).is_some();
        self.current_removed = removed;
        trace!(event_type = %self.event_type, timestamp, removed, "cursor remove");
        Ok(removed)
    }

    /// Release buffered entries. Idempotent; never touches the index.
    ///
    /// After closing, [`move_next`](Self::move_next) returns `false`.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.inner.release();
        if self.state == CursorState::NotStarted {
            self.state = CursorState::Exhausted;
        }
        trace!(event_type = %self.event_type, state = ?self.state, "cursor closed");
    }

    fn positioned(&self) -> Result<&Arc<Event>, StoreError> {
        match (&self.state, &self.current) {
            (CursorState::Positioned, Some(event)) => Ok(event),
            (state, _) => Err(StoreError::InvalidState { state: *state }),
        }
    }
}

impl Iterator for TypeFilteredCursor {
    type Item = Arc<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.move_next() {
            self.current_shared().ok()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::OrderedEventIndex;

    fn cursor_over(events: &[(&str, i64)], event_type: &str) -> (Arc<OrderedEventIndex>, TypeFilteredCursor) {
        let index = Arc::new(OrderedEventIndex::new());
        for &(t, ts) in events {
            index.insert(Event::new(t, ts));
        }
        let cursor = TypeFilteredCursor::new(index.range_cursor(0, 400_000, 2), event_type);
        (index, cursor)
    }

    #[test]
    fn starts_not_started() {
        let (_, cursor) = cursor_over(&[("A", 1)], "A");
        assert_eq!(cursor.state(), CursorState::NotStarted);
        assert_eq!(
            cursor.current().err(),
            Some(StoreError::InvalidState {
                state: CursorState::NotStarted
            })
        );
    }

    #[test]
    fn skips_other_types() {
        let (_, cursor) = cursor_over(
            &[("A", 360_000), ("B", 360_003), ("C", 340_423), ("A", 350_423), ("C", 40_423)],
            "C",
        );
        let seen: Vec<i64> = cursor.map(|e| e.timestamp()).collect();
        assert_eq!(seen, vec![40_423, 340_423]);
    }

    #[test]
    fn exhaustion_is_terminal_and_idempotent() {
        let (_, mut cursor) = cursor_over(&[("A", 1)], "A");
        assert!(cursor.move_next());
        assert_eq!(cursor.current().map(Event::timestamp), Ok(1));
        assert!(!cursor.move_next());
        assert!(!cursor.move_next());

        let exhausted = Err(StoreError::InvalidState {
            state: CursorState::Exhausted,
        });
        assert_eq!(cursor.current().map(Event::timestamp), exhausted);
        assert_eq!(cursor.remove(), Err(StoreError::InvalidState {
            state: CursorState::Exhausted,
        }));
        assert_eq!(cursor.state(), CursorState::Exhausted);
    }

    #[test]
    fn remove_before_start_fails_and_keeps_index() {
        let (index, mut cursor) = cursor_over(&[("A", 1)], "A");
        assert!(cursor.remove().is_err());
        assert_eq!(index.len(), 1);
        assert_eq!(cursor.state(), CursorState::NotStarted);
    }

    #[test]
    fn remove_deletes_current_from_index() {
        let (index, mut cursor) = cursor_over(&[("A", 1), ("B", 2), ("A", 3)], "A");
        assert!(cursor.move_next());
        assert_eq!(cursor.remove(), Ok(true));
        assert_eq!(index.len(), 2);

        // The removed event stays current until the cursor moves.
        assert_eq!(cursor.current().map(Event::timestamp), Ok(1));
        assert_eq!(cursor.remove(), Ok(false));

        assert!(cursor.move_next());
        assert_eq!(cursor.current().map(Event::timestamp), Ok(3));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn remove_after_overwrite_deletes_the_key() {
        let (index, mut cursor) = cursor_over(&[("A", 1)], "A");
        assert!(cursor.move_next());

        index.insert(Event::new("A", 1));
        assert_eq!(cursor.remove(), Ok(true));
        assert!(index.is_empty());
    }

    #[test]
    fn repeated_remove_leaves_a_reinserted_event() {
        let (index, mut cursor) = cursor_over(&[("A", 1)], "A");
        assert!(cursor.move_next());
        assert_eq!(cursor.remove(), Ok(true));

        index.insert(Event::new("A", 1));
        assert_eq!(cursor.remove(), Ok(false));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn second_cursor_on_a_removed_key_reports_nothing_removed() {
        let (index, mut first) = cursor_over(&[("A", 1)], "A");
        let mut second = TypeFilteredCursor::new(index.range_cursor(0, 10, 2), "A");
        assert!(first.move_next());
        assert!(second.move_next());

        assert_eq!(first.remove(), Ok(true));
        assert_eq!(second.remove(), Ok(false));
        assert!(index.is_empty());
    }

    #[test]
    fn close_is_idempotent_and_stops_traversal() {
        let (index, mut cursor) = cursor_over(&[("A", 1), ("A", 2)], "A");
        cursor.close();
        cursor.close();
        assert!(!cursor.move_next());
        assert!(cursor.current().is_err());
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn close_while_positioned_keeps_current() {
        let (_, mut cursor) = cursor_over(&[("A", 1), ("A", 2)], "A");
        assert!(cursor.move_next());
        cursor.close();
        assert_eq!(cursor.current().map(Event::timestamp), Ok(1));
        assert!(!cursor.move_next());
        assert!(cursor.current().is_err());
    }

    #[test]
    fn state_display() {
        assert_eq!(CursorState::Exhausted.to_string(), "cursor is exhausted");
        assert_eq!(
            StoreError::InvalidState {
                state: CursorState::NotStarted
            }
            .to_string(),
            "invalid cursor state: cursor has not been advanced"
        );
    }
}
