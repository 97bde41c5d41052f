//! pkgplan - Incremental build planner for OS source packages
//!
//! Reads a build manifest and per-source packaging metadata, works out which
//! source packages changed since their last build, and emits an ordered list
//! of bounded batches for a build driver to execute.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface parsing and output formatting
//! - [`core`] - Planning logic (graph, closure, rebuild decisions, scheduling)
//! - [`infra`] - Infrastructure layer (filesystem, git, metadata command)
//! - [`config`] - Constants and defaults
//! - [`error`] - Error types and handling

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod infra;

#[cfg(test)]
pub mod test_utils;
