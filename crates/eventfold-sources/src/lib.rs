//! EventSource trait and implementations.
//!
//! This crate provides the sources a listing draws from:
//!
//! - [`EventSource`] - The trait every source implements
//! - [`local::LocalEventSource`] - Stored events, with recurring ones expanded
//! - [`remote::RemoteSource`] - Another deployment's listing endpoint
//! - [`SourceError`] - Error types for source operations
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │   EventStore    │    │ Remote listing  │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌─────────────────┐
//! │LocalEventSource │    │  RemoteSource   │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          │     EventSource      │
//!          └──────────┬───────────┘
//!                     │
//!                     ▼
//!              ┌─────────────┐
//!              │ Occurrence  │
//!              └─────────────┘
//! ```

pub mod error;
pub mod local;
#[cfg(feature = "remote")]
pub mod remote;
pub mod source;

pub use error::{SourceError, SourceErrorCode, SourceResult};
pub use source::{BoxFuture, ErrorSource, EventSource, FetchResult, SourceQuery};
