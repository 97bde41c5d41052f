//! Error types for pkgplan
//!
//! Domain-specific error types using thiserror. Every error here is fatal for
//! a planning run: a plan is only emitted when all inputs were valid.

use std::path::PathBuf;
use thiserror::Error;

/// Manifest loading and validation errors
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Manifest file not found
    #[error("Manifest not found at '{path}'")]
    NotFound { path: PathBuf },

    /// Manifest could not be parsed
    #[error("Failed to parse manifest '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// The same source name is declared twice
    #[error("Source '{name}' is declared more than once in the manifest")]
    DuplicateSource { name: String },

    /// An explicit dependency names a source the manifest does not declare
    #[error("Source '{package}' declares explicit dependency on unknown source '{dependency}'")]
    UnknownExplicitDependency { package: String, dependency: String },
}

/// Errors raised by a metadata provider
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Metadata command could not be located
    #[error("Metadata command '{command}' not found: {error}")]
    CommandNotFound { command: String, error: String },

    /// Control file does not exist
    #[error("Control file not found: {path}")]
    ControlFileMissing { path: PathBuf },

    /// Metadata command could not be started
    #[error("Failed to run '{command}': {error}")]
    Spawn { command: String, error: String },

    /// Metadata command exited unsuccessfully
    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// Metadata command produced output that is not valid control info
    #[error("Invalid metadata for '{path}': {error}")]
    InvalidOutput { path: PathBuf, error: String },
}

/// Dependency graph construction errors
#[derive(Error, Debug)]
pub enum GraphError {
    /// Checkout directory of a manifest source is absent
    #[error("'{path}' not found for source '{package}', did you forget to run the checkout step?")]
    MissingSourceTree { package: String, path: PathBuf },

    /// Metadata could not be resolved for a package that needs it
    #[error("Failed to resolve metadata for '{package}' from '{path}': {source}")]
    MetadataResolution {
        package: String,
        path: PathBuf,
        source: MetadataError,
    },

    /// Two sources produce the same binary package
    #[error("Binary package '{name}' is produced by both '{first}' and '{second}'")]
    DuplicateBinaryPackage {
        name: String,
        first: String,
        second: String,
    },
}

/// Version control query errors
#[derive(Error, Debug)]
pub enum VersionControlError {
    /// Path is not a readable repository
    #[error("Invalid repository at '{path}': {error}")]
    InvalidRepository { path: PathBuf, error: String },

    /// HEAD could not be resolved to a commit
    #[error("Failed to resolve HEAD in '{path}': {error}")]
    HeadUnresolved { path: PathBuf, error: String },

    /// Working tree status could not be computed
    #[error("Failed to read working tree status of '{path}': {error}")]
    StatusFailed { path: PathBuf, error: String },
}

/// Filesystem errors
#[derive(Error, Debug)]
pub enum FilesystemError {
    /// Failed to create directory
    #[error("Failed to create directory '{path}': {error}")]
    CreateDir { path: PathBuf, error: String },

    /// Failed to write file
    #[error("Failed to write file '{path}': {error}")]
    WriteFile { path: PathBuf, error: String },

    /// Failed to read file
    #[error("Failed to read file '{path}': {error}")]
    ReadFile { path: PathBuf, error: String },
}

/// Errors while classifying packages as changed or unchanged
#[derive(Error, Debug)]
pub enum RebuildError {
    /// Version control provider failed
    #[error("Version control error for '{package}': {source}")]
    VersionControl {
        package: String,
        source: VersionControlError,
    },

    /// Hash record could not be read
    #[error("Hash record error for '{package}': {source}")]
    HashRecord {
        package: String,
        source: FilesystemError,
    },
}

/// Build plan scheduling errors
#[derive(Error, Debug)]
pub enum SchedulerError {
    /// The rebuild graph is not a DAG
    #[error("Circular dependency detected: {}", cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },
}

/// Planner configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file '{path}': {error}")]
    Read { path: PathBuf, error: String },

    /// Failed to parse config file
    #[error("Failed to parse config file '{path}': {error}")]
    Parse { path: PathBuf, error: String },

    /// Parallelism limit must be positive
    #[error("Parallel build limit must be at least 1, got {value}")]
    InvalidParallelism { value: usize },
}

/// Top-level pkgplan error type
#[derive(Error, Debug)]
pub enum PlanError {
    /// Graph error
    #[error("Dependency graph error: {0}")]
    Graph(#[from] GraphError),

    /// Rebuild decision error
    #[error("Rebuild decision error: {0}")]
    Rebuild(#[from] RebuildError),

    /// Scheduler error
    #[error("Scheduling error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Config error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
