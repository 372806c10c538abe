//! In-memory, concurrent store of timestamped, typed events.
//!
//! Events are kept in an ordered index keyed by timestamp. Callers insert
//! events, remove every event of a type, and query a `[start, end)` range
//! for a single type through a lazily-evaluated cursor.
//!
//! # Modules
//!
//! - [`index`] -- [`OrderedEventIndex`], the concurrent sorted map and its
//!   weakly-consistent [`RangeCursor`].
//! - [`cursor`] -- [`TypeFilteredCursor`], the single-type view with the
//!   move/inspect/remove protocol.
//! - [`store`] -- The [`EventStore`] and [`EventIterator`] traits and the
//!   [`ConcurrentEventStore`] facade.
//! - [`config`] -- [`StoreConfig`] loading from YAML.
//! - [`error`] -- [`StoreError`].
//!
//! # Consistency
//!
//! Single-key operations are atomic. Range traversal is weakly
//! consistent: a cursor never revisits a key and never skips a key that
//! stayed present while it was traversing, but it may or may not observe
//! inserts and removals that happen concurrently.
//!
//! # Usage
//!
//! ```
//! use tideline_store::{ConcurrentEventStore, EventIterator, EventStore};
//! use tideline_types::Event;
//!
//! let store = ConcurrentEventStore::new();
//! store.insert(Event::new("A", 360_000));
//! store.insert(Event::new("A", 340_423));
//! store.insert(Event::new("B", 350_000));
//!
//! let mut cursor = store.query("A", 0, 400_000);
//! let mut seen = Vec::new();
//! while cursor.move_next() {
//!     if let Ok(event) = cursor.current() {
//!         seen.push(event.timestamp());
//!     }
//! }
//! assert_eq!(seen, vec![340_423, 360_000]);
//! ```

pub mod config;
pub mod cursor;
pub mod error;
pub mod index;
pub mod store;

// Re-export primary types at crate root.
pub use config::{ConfigError, StoreConfig};
pub use cursor::{CursorState, TypeFilteredCursor};
pub use error::StoreError;
pub use index::{OrderedEventIndex, RangeCursor};
pub use store::{ConcurrentEventStore, EventIterator, EventStore};
