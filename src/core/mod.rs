//! Core planning logic
//!
//! Nothing here spawns processes or touches git directly; those belong in
//! [`crate::infra`] behind the ports declared here.
//!
//! # Submodules
//!
//! - [`manifest`] - Build manifest parsing and validation
//! - [`config`] - Planner configuration
//! - [`metadata`] - Package metadata port
//! - [`depends`] - Dependency expression normalization
//! - [`graph`] - Binary package index construction
//! - [`closure`] - Transitive dependency closure
//! - [`rebuild`] - Rebuild decisions and the version control/hash record ports
//! - [`propagate`] - Rebuild propagation to consumers
//! - [`scheduler`] - Layered, bounded batch scheduling
//! - [`planner`] - The full planning pipeline

pub mod closure;
pub mod config;
pub mod depends;
pub mod graph;
pub mod manifest;
pub mod metadata;
pub mod planner;
pub mod propagate;
pub mod rebuild;
pub mod scheduler;
