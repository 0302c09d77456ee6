//! Listing request parameters and the event listing contract.
//!
//! Every deployment exposes the listing it consumes: a request is a flat
//! set of query parameters ([`ListParams`]) and a response is a
//! [`ListResponse`]:
//!
//! ```json
//! {
//!   "events": [{ "id": 42, "title": {"rendered": "..."}, "meta": {...}, "tags": [...] }],
//!   "sources": [{ "id": "local", "name": "Local Events", "url": "..." }],
//!   "pagination": { "total": 25, "per_page": 10, "current_page": 1, "total_pages": 3 }
//! }
//! ```

mod convert;
mod error;
mod request;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use request::{EventFilters, ListParams, ListRequest, ValidationError};
pub use types::{
    ListResponse, Pagination, RemotePayload, SourceInfo, SourceStatus, WireEvent, WireId,
    WireMeta, WireTerm, WireText,
};

/// Path of the listing endpoint, relative to a deployment's base URL.
pub const EVENTS_PATH: &str = "wp-json/event-manager/v1/events";
