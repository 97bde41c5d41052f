//! Hash record directory
//!
//! The build driver writes `<HASH_DIR>/<package>.hash` after each successful
//! build, holding the commit the package was built from. The planner only
//! reads these records.

use std::path::PathBuf;

use crate::config::defaults::HASH_FILE_EXTENSION;
use crate::core::rebuild::HashStore;
use crate::error::FilesystemError;
use crate::infra::filesystem;

/// Hash records stored one file per package
#[derive(Debug, Clone)]
pub struct HashDir {
    root: PathBuf,
}

impl HashDir {
    /// Read records from `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Record file for a package
    pub fn record_path(&self, package: &str) -> PathBuf {
        self.root.join(format!("{package}.{HASH_FILE_EXTENSION}"))
    }
}

impl HashStore for HashDir {
    fn last_built(&self, package: &str) -> Result<Option<String>, FilesystemError> {
        let path = self.record_path(package);
        if !path.exists() {
            return Ok(None);
        }

        let content = filesystem::read_file(&path)?;
        let sha = content.trim();
        if sha.is_empty() {
            tracing::warn!("Ignoring empty hash record {}", path.display());
            return Ok(None);
        }
        Ok(Some(sha.to_string()))
    }
}
