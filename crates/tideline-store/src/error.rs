//! Error types for the `tideline-store` crate.
//!
//! Store operations themselves never fail: duplicate timestamps overwrite,
//! degenerate ranges yield empty cursors, and unknown types simply match
//! nothing. The only runtime failure is misuse of the cursor protocol.

use crate::cursor::CursorState;

/// Errors raised by cursor operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// `current()` or `remove()` was called while the cursor was not
    /// positioned on an event.
    #[error("invalid cursor state: {state}")]
    InvalidState {
        /// The state the cursor was in when the call was made.
        state: CursorState,
    },
}
