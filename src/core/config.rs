//! Planner configuration
//!
//! Settings are read from an optional `config.toml` (see
//! [`crate::infra::dirs::PlannerDirs`]) and then overridden by command-line
//! flags and environment variables.
//!
//! ```toml
//! [planner]
//! parallel_builds = 8
//!
//! [packages]
//! umbrella = "truenas"
//! kernel = "kernel"
//! bootstrap = ["kernel"]
//!
//! [metadata]
//! command = "./scripts/parse_deps.pl"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::config::defaults::{
    DEFAULT_BOOTSTRAP_PACKAGES, DEFAULT_KERNEL_PACKAGE, DEFAULT_METADATA_COMMAND,
    DEFAULT_PARALLEL_BUILDS, DEFAULT_UMBRELLA_PACKAGE,
};
use crate::error::ConfigError;

/// Planner configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlannerConfig {
    /// Scheduling settings
    #[serde(default)]
    pub planner: SchedulingConfig,

    /// Packages with special roles in the graph
    #[serde(default)]
    pub packages: PackageRoles,

    /// Metadata provider settings
    #[serde(default)]
    pub metadata: MetadataConfig,
}

/// Scheduling settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SchedulingConfig {
    /// Maximum packages per batch
    pub parallel_builds: Option<usize>,

    /// Serial mode: forces one package per batch
    pub debug: Option<bool>,
}

/// Packages with special roles in the graph
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PackageRoles {
    /// Umbrella package: always rebuilt, runtime deps become build deps
    #[serde(default = "default_umbrella")]
    pub umbrella: String,

    /// Package kernel module sources implicitly build-depend on
    #[serde(default = "default_kernel")]
    pub kernel: String,

    /// Sources without usable metadata, modelled as dependency-free leaves
    #[serde(default = "default_bootstrap")]
    pub bootstrap: BTreeSet<String>,
}

fn default_umbrella() -> String {
    DEFAULT_UMBRELLA_PACKAGE.to_string()
}

fn default_kernel() -> String {
    DEFAULT_KERNEL_PACKAGE.to_string()
}

fn default_bootstrap() -> BTreeSet<String> {
    DEFAULT_BOOTSTRAP_PACKAGES
        .iter()
        .map(ToString::to_string)
        .collect()
}

impl Default for PackageRoles {
    fn default() -> Self {
        Self {
            umbrella: default_umbrella(),
            kernel: default_kernel(),
            bootstrap: default_bootstrap(),
        }
    }
}

impl PackageRoles {
    /// Whether `name` is the umbrella package
    pub fn is_umbrella(&self, name: &str) -> bool {
        self.umbrella == name
    }

    /// Whether `name` is a designated bootstrap package
    pub fn is_bootstrap(&self, name: &str) -> bool {
        self.bootstrap.contains(name)
    }
}

/// Metadata provider settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MetadataConfig {
    /// Command converting a control file into JSON
    pub command: Option<PathBuf>,
}

impl PlannerConfig {
    /// Load configuration from a specific path
    ///
    /// A missing file yields the default configuration; an unreadable or
    /// invalid one is an error.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Effective batch size limit
    ///
    /// Debug mode forces serial builds regardless of the configured limit.
    pub fn parallelism(&self) -> Result<NonZeroUsize, ConfigError> {
        if self.planner.debug.unwrap_or(false) {
            return Ok(NonZeroUsize::MIN);
        }

        let value = self
            .planner
            .parallel_builds
            .unwrap_or(DEFAULT_PARALLEL_BUILDS);
        NonZeroUsize::new(value).ok_or(ConfigError::InvalidParallelism { value })
    }

    /// Metadata command, falling back to the default parse script
    pub fn metadata_command(&self) -> PathBuf {
        self.metadata
            .command
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA_COMMAND))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.parallelism().unwrap().get(), DEFAULT_PARALLEL_BUILDS);
        assert!(config.packages.is_umbrella("truenas"));
        assert!(config.packages.is_bootstrap("kernel"));
        assert_eq!(config.packages.kernel, "kernel");
        assert_eq!(
            config.metadata_command(),
            PathBuf::from("./scripts/parse_deps.pl")
        );
    }

    #[test]
    fn test_debug_forces_serial() {
        let mut config = PlannerConfig::default();
        config.planner.parallel_builds = Some(16);
        config.planner.debug = Some(true);
        assert_eq!(config.parallelism().unwrap().get(), 1);
    }

    #[test]
    fn test_zero_parallelism_rejected() {
        let mut config = PlannerConfig::default();
        config.planner.parallel_builds = Some(0);
        assert!(matches!(
            config.parallelism(),
            Err(ConfigError::InvalidParallelism { value: 0 })
        ));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let temp = TempDir::new().unwrap();
        let config = PlannerConfig::load_from_path(&temp.path().join("config.toml")).unwrap();
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(
            &path,
            "[planner]\nparallel_builds = 2\n\n[packages]\numbrella = \"product\"\n",
        )
        .unwrap();

        let config = PlannerConfig::load_from_path(&path).unwrap();
        assert_eq!(config.parallelism().unwrap().get(), 2);
        assert_eq!(config.packages.umbrella, "product");
        assert_eq!(config.packages.kernel, "kernel");
        assert!(config.packages.is_bootstrap("kernel"));
    }

    #[test]
    fn test_load_invalid_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, "[planner\nparallel_builds = ").unwrap();

        assert!(matches!(
            PlannerConfig::load_from_path(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
