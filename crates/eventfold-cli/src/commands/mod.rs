//! Command implementations.

pub mod config;
pub mod expand;
pub mod list;
