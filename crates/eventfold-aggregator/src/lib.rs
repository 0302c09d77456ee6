//! Concurrent multi-source listing.
//!
//! This crate provides the [`Aggregator`] that handles:
//! - Selecting the local source and remote deployments for a request
//! - Fetching them concurrently under one request deadline
//! - Re-filtering remote results by the request's tags
//! - Merging, sorting and paginating the combined occurrences
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use eventfold_aggregator::{Aggregator, AggregatorConfig};
//! use eventfold_protocol::ListParams;
//! use eventfold_sources::local::MemoryStore;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(MemoryStore::load(std::path::Path::new("events.json"))?);
//!     let aggregator = Aggregator::from_parts(AggregatorConfig::default(), store, Vec::new())?;
//!
//!     let outcome = aggregator
//!         .list_params(&ListParams::from_query("tags=online&per_page=20"))
//!         .await?;
//!     println!("{}", outcome.response.to_json_pretty()?);
//!     Ok(())
//! }
//! ```

mod aggregator;
mod config;
mod error;

pub use aggregator::{Aggregator, ListOutcome};
pub use config::{AggregatorConfig, LocalSourceSettings};
pub use error::{AggregateError, AggregateResult};
