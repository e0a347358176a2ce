//! CLI, configuration file, JSON page output
//!
//! This crate provides the `eventdeck` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::Cli;
pub use error::{ClientError, ClientResult};
