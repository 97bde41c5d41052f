//! Metadata command adapter
//!
//! Runs an external parse command on a control file and decodes the JSON it
//! prints on stdout:
//!
//! ```json
//! {
//!   "source_package": {"name": "zfs-linux", "build_depends": "debhelper (>= 12), libssl-dev"},
//!   "binary_packages": [{"name": "zfsutils-linux", "depends": "${shlibs:Depends}, python3"}]
//! }
//! ```

use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::metadata::{ControlInfo, MetadataProvider};
use crate::error::MetadataError;

/// Metadata provider spawning a parse command per control file
#[derive(Debug, Clone)]
pub struct CommandMetadataProvider {
    program: PathBuf,
}

impl CommandMetadataProvider {
    /// Use `program` (a name on `PATH` or a path) as the parse command
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Resolve the command to an executable path
    pub fn locate(&self) -> Result<PathBuf, MetadataError> {
        which::which(&self.program).map_err(|e| MetadataError::CommandNotFound {
            command: self.program.display().to_string(),
            error: e.to_string(),
        })
    }
}

impl MetadataProvider for CommandMetadataProvider {
    fn control_info(&self, control_path: &Path) -> Result<ControlInfo, MetadataError> {
        if !control_path.is_file() {
            return Err(MetadataError::ControlFileMissing {
                path: control_path.to_path_buf(),
            });
        }

        let program = self.locate()?;
        let command = program.display().to_string();
        tracing::debug!("Running {} {}", command, control_path.display());

        let output = Command::new(&program)
            .arg(control_path)
            .output()
            .map_err(|e| MetadataError::Spawn {
                command: command.clone(),
                error: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(MetadataError::CommandFailed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        serde_json::from_slice(&output.stdout).map_err(|e| MetadataError::InvalidOutput {
            path: control_path.to_path_buf(),
            error: e.to_string(),
        })
    }
}
