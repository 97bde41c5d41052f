//! Infrastructure layer
//!
//! Handles all I/O operations: filesystem, git checkouts and the external
//! metadata command. Adapters here implement the ports declared in
//! [`crate::core`].

pub mod dirs;
pub mod filesystem;
pub mod git;
pub mod hashes;
pub mod metadata;
