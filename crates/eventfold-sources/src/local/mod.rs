//! Locally stored events.

mod source;
mod store;

pub use source::{LOCAL_SOURCE_ID, LocalEventSource};
pub use store::{EventStore, MemoryStore, matches_filters};
