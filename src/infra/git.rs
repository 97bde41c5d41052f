//! Git operations
//!
//! Reads checkout state using the gix crate.

use std::path::Path;

use crate::core::rebuild::VersionControl;
use crate::error::VersionControlError;

/// Version control backed by gix
#[derive(Debug, Default, Clone, Copy)]
pub struct GixVersionControl;

impl GixVersionControl {
    /// Create a new git reader
    pub fn new() -> Self {
        Self
    }

    fn open(checkout: &Path) -> Result<gix::Repository, VersionControlError> {
        gix::open(checkout).map_err(|e| VersionControlError::InvalidRepository {
            path: checkout.to_path_buf(),
            error: e.to_string(),
        })
    }
}

impl VersionControl for GixVersionControl {
    fn head_commit(&self, checkout: &Path) -> Result<String, VersionControlError> {
        let repo = Self::open(checkout)?;
        let id = repo
            .head_id()
            .map_err(|e| VersionControlError::HeadUnresolved {
                path: checkout.to_path_buf(),
                error: e.to_string(),
            })?;

        Ok(id.detach().to_hex().to_string())
    }

    /// Whether a tracked file differs from the index
    ///
    /// Untracked files and changes inside submodules do not count.
    fn is_dirty(&self, checkout: &Path) -> Result<bool, VersionControlError> {
        let repo = Self::open(checkout)?;
        let status_failed = |error: String| VersionControlError::StatusFailed {
            path: checkout.to_path_buf(),
            error,
        };

        let mut changes = repo
            .status(gix::progress::Discard)
            .map_err(|e| status_failed(e.to_string()))?
            .index_worktree_submodules(gix::status::Submodule::Given {
                ignore: gix::submodule::config::Ignore::All,
                check_dirty: false,
            })
            .index_worktree_options_mut(|opts| opts.dirwalk_options = None)
            .into_index_worktree_iter(Vec::new())
            .map_err(|e| status_failed(e.to_string()))?;

        match changes.next() {
            Some(Err(e)) => Err(status_failed(e.to_string())),
            Some(Ok(_)) => Ok(true),
            None => Ok(false),
        }
    }
}
