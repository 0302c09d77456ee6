//! CLI, client configuration, listing and expansion commands
//!
//! This crate provides the `eventfold` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use config::EventfoldConfig;
pub use error::{ClientError, ClientResult};
