//! Remote deployments.
//!
//! A remote source queries another deployment's listing endpoint with the
//! request's filters and attributes every returned event to its own id.
//!
//! # Example
//!
//! ```ignore
//! use eventfold_sources::remote::{RemoteSource, RemoteSourceConfig};
//!
//! let config = RemoteSourceConfig::new("north", "https://north.example.org/")?
//!     .with_name("North Region")
//!     .with_service_body("4,5");
//!
//! let source = RemoteSource::new(config)?;
//! let result = source.fetch(SourceQuery::new(today)).await?;
//! ```

mod client;
mod config;
mod source;

pub use client::RemoteClient;
pub use config::RemoteSourceConfig;
pub use source::{RemoteSource, remote_params};
