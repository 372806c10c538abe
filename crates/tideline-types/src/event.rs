//! The immutable event value stored by the index.
//!
//! An [`Event`] is a `(type, timestamp)` pair. The type is an opaque,
//! caller-supplied string; the timestamp is a signed count of milliseconds
//! since the Unix epoch. Neither field is validated.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Milliseconds in one second.
pub const MILLIS_PER_SECOND: i64 = 1_000;

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// An immutable, typed, timestamped event.
///
/// Serialized as `{"type": "...", "timestamp": 123}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Caller-supplied event type.
    #[serde(rename = "type")]
    event_type: String,

    /// Event time in milliseconds.
    timestamp: i64,
}

impl Event {
    /// Create a new event.
    pub fn new(event_type: impl Into<String>, timestamp: i64) -> Self {
        Self {
            event_type: event_type.into(),
            timestamp,
        }
    }

    /// Create an event stamped with the current wall-clock time.
    pub fn now(event_type: impl Into<String>) -> Self {
        Self::new(event_type, now_millis())
    }

    /// Create an event stamped `seconds_ago` seconds before now.
    ///
    /// Saturates at the `i64` bounds instead of overflowing.
    pub fn seconds_ago(event_type: impl Into<String>, seconds_ago: i64) -> Self {
        let offset = seconds_ago.saturating_mul(MILLIS_PER_SECOND);
        Self::new(event_type, now_millis().saturating_sub(offset))
    }

    /// The event type.
    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The event timestamp in milliseconds.
    pub const fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Whether this event has the given type.
    pub fn is_type(&self, event_type: &str) -> bool {
        self.event_type == event_type
    }
}

impl core::fmt::Display for Event {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}@{}", self.event_type, self.timestamp)
    }
}
