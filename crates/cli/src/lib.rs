//! CLI tool for exercising the sharded key-value store.
//!
//! Provides commands for:
//! - Inspecting how keys spread over nodes
//! - Adding/removing nodes and measuring the keys that move
//! - Comparing consistent hashing against full rehashing

pub mod commands;
pub mod config;

pub use commands::{Command, CommandResult};
pub use config::CliConfig;
