//! Package metadata port
//!
//! The planner never parses packaging syntax itself. A [`MetadataProvider`]
//! hands it already-structured control information; see
//! [`crate::infra::metadata::CommandMetadataProvider`] for the default adapter.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::MetadataError;

/// Structured contents of one control file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ControlInfo {
    /// Source stanza
    pub source_package: SourcePackageInfo,

    /// Binary package stanzas, in file order
    #[serde(default)]
    pub binary_packages: Vec<BinaryPackageInfo>,
}

/// Source stanza of a control file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SourcePackageInfo {
    /// Source package name as declared in the control file
    pub name: String,

    /// Raw `Build-Depends` expression
    #[serde(default)]
    pub build_depends: Option<String>,
}

/// Binary stanza of a control file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct BinaryPackageInfo {
    /// Binary package name
    pub name: String,

    /// Raw `Depends` expression
    #[serde(default)]
    pub depends: Option<String>,
}

impl ControlInfo {
    /// Create control info for a source stanza
    pub fn new(source_name: impl Into<String>, build_depends: impl Into<String>) -> Self {
        Self {
            source_package: SourcePackageInfo {
                name: source_name.into(),
                build_depends: Some(build_depends.into()),
            },
            binary_packages: Vec::new(),
        }
    }

    /// Add a binary stanza
    #[must_use]
    pub fn with_binary(mut self, name: impl Into<String>, depends: impl Into<String>) -> Self {
        self.binary_packages.push(BinaryPackageInfo {
            name: name.into(),
            depends: Some(depends.into()),
        });
        self
    }
}

/// Source of structured package metadata
pub trait MetadataProvider {
    /// Read the control file at `control_path`
    fn control_info(&self, control_path: &Path) -> Result<ControlInfo, MetadataError>;
}
