//! Platform-specific directory management
//!
//! Locates the per-user configuration directory. Follows the XDG Base
//! Directory Specification on Linux and standard locations on macOS.
//!
//! `PKGPLAN_CONFIG_DIR` overrides the default location.

use std::env;
use std::path::PathBuf;

/// Environment variable overriding the config directory
pub const ENV_CONFIG_DIR: &str = "PKGPLAN_CONFIG_DIR";

/// Application name used in directory paths
const APP_NAME: &str = "pkgplan";

/// Config file name inside the config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Platform-specific directory provider
#[derive(Debug, Clone)]
pub struct PlannerDirs {
    config_dir: PathBuf,
}

impl PlannerDirs {
    /// Resolve directories from the environment or platform defaults
    #[must_use]
    pub fn new() -> Self {
        Self {
            config_dir: Self::resolve_config_dir(),
        }
    }

    /// Get the config directory path
    ///
    /// - Linux: `$XDG_CONFIG_HOME/pkgplan` or `~/.config/pkgplan`
    /// - macOS: `~/Library/Application Support/pkgplan`
    #[must_use]
    pub fn config_dir(&self) -> PathBuf {
        self.config_dir.clone()
    }

    /// Get the global config file path
    #[must_use]
    pub fn global_config_path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    fn resolve_config_dir() -> PathBuf {
        if let Ok(path) = env::var(ENV_CONFIG_DIR) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .map(|p| p.join(APP_NAME))
            .unwrap_or_else(|| {
                // Fallback to home directory
                dirs::home_dir()
                    .map(|h| h.join(".config").join(APP_NAME))
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            })
    }
}

impl Default for PlannerDirs {
    fn default() -> Self {
        Self::new()
    }
}
