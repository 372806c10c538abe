//! Shared type definitions for the Tideline event store.
//!
//! This crate is the single source of truth for the value stored by the
//! index. It has no behavior beyond construction and field access, so it
//! can be shared by the store, the load generator, and any caller that
//! produces events.
//!
//! # Modules
//!
//! - [`event`] -- The immutable [`Event`] value and timestamp helpers.

pub mod event;

// Re-export all public types at crate root for convenience.
pub use event::{Event, MILLIS_PER_SECOND, now_millis};
