//! Build manifest parsing and validation
//!
//! The manifest lists every source package of the product, in the order the
//! build driver declares them. That order is significant: it is the tie-breaker
//! for packages that land in the same layer of the build plan.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults::{CONTROL_FILE_NAME, DEFAULT_CONTROL_PATH};
use crate::error::ManifestError;

/// The build manifest
///
/// Only the `sources` list matters to the planner; other top-level keys
/// (ISO settings, apt repositories, ...) are ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    /// Source packages in declaration order
    #[serde(default)]
    pub sources: Vec<SourceSpec>,
}

/// A source package declaration
///
/// Keys the planner does not interpret are kept in [`SourceSpec::extra`] so the
/// emitted plan hands the build driver the full record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceSpec {
    /// Unique source name, also the checkout directory name
    pub name: String,

    /// Subdirectory of the checkout holding the packaging
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subdir: Option<PathBuf>,

    /// Directory containing the control file, relative to the package path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deps_path: Option<PathBuf>,

    /// Commands run before dependencies can be determined
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub predepscmd: Vec<String>,

    /// Builds an out-of-tree kernel module
    #[serde(default, skip_serializing_if = "is_false")]
    pub kernel_module: bool,

    /// Source packages this one always depends on
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub explicit_deps: BTreeSet<String>,

    /// Remaining keys, passed through untouched
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(value: &bool) -> bool {
    !*value
}

impl SourceSpec {
    /// Create a source declaration with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subdir: None,
            deps_path: None,
            predepscmd: Vec::new(),
            kernel_module: false,
            explicit_deps: BTreeSet::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Set the packaging subdirectory
    #[must_use]
    pub fn with_subdir(mut self, subdir: impl Into<PathBuf>) -> Self {
        self.subdir = Some(subdir.into());
        self
    }

    /// Set the control file directory
    #[must_use]
    pub fn with_deps_path(mut self, deps_path: impl Into<PathBuf>) -> Self {
        self.deps_path = Some(deps_path.into());
        self
    }

    /// Add a pre-dependency command
    #[must_use]
    pub fn with_predepscmd(mut self, command: impl Into<String>) -> Self {
        self.predepscmd.push(command.into());
        self
    }

    /// Mark as a kernel module source
    #[must_use]
    pub fn with_kernel_module(mut self) -> Self {
        self.kernel_module = true;
        self
    }

    /// Add explicit source dependencies
    #[must_use]
    pub fn with_explicit_deps<I, S>(mut self, deps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.explicit_deps.extend(deps.into_iter().map(Into::into));
        self
    }

    /// Whether dependencies are only known after running `predepscmd`
    ///
    /// Such sources have no control file in their checked-out state unless a
    /// `deps_path` points at one.
    pub fn needs_predeps_without_control(&self) -> bool {
        !self.predepscmd.is_empty() && self.deps_path.is_none()
    }

    /// Checkout directory under the sources root
    pub fn checkout_dir(&self, sources_root: &Path) -> PathBuf {
        sources_root.join(&self.name)
    }

    /// Directory holding the packaging (checkout plus optional `subdir`)
    pub fn package_dir(&self, sources_root: &Path) -> PathBuf {
        let checkout = self.checkout_dir(sources_root);
        match &self.subdir {
            Some(subdir) => checkout.join(subdir),
            None => checkout,
        }
    }

    /// Location of the control file describing this source
    pub fn control_path(&self, sources_root: &Path) -> PathBuf {
        let package_dir = self.package_dir(sources_root);
        match &self.deps_path {
            Some(deps_path) => package_dir.join(deps_path).join(CONTROL_FILE_NAME),
            None => package_dir.join(DEFAULT_CONTROL_PATH),
        }
    }
}

impl Manifest {
    /// Create a manifest from source declarations
    pub fn new(sources: Vec<SourceSpec>) -> Self {
        Self { sources }
    }

    /// Parse from YAML string
    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(content)
    }

    /// Load and validate a manifest file
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        if !path.exists() {
            return Err(ManifestError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let content = fs::read_to_string(path).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let manifest = Self::from_yaml(&content).map_err(|e| ManifestError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        manifest.validate()?;
        tracing::debug!(
            "Loaded manifest {} with {} sources",
            path.display(),
            manifest.sources.len()
        );
        Ok(manifest)
    }

    /// Check source names are unique and explicit dependencies resolve
    pub fn validate(&self) -> Result<(), ManifestError> {
        let mut seen = HashSet::new();
        for source in &self.sources {
            if !seen.insert(source.name.as_str()) {
                return Err(ManifestError::DuplicateSource {
                    name: source.name.clone(),
                });
            }
        }

        for source in &self.sources {
            if let Some(unknown) = source
                .explicit_deps
                .iter()
                .find(|dep| !seen.contains(dep.as_str()))
            {
                return Err(ManifestError::UnknownExplicitDependency {
                    package: source.name.clone(),
                    dependency: unknown.clone(),
                });
            }
        }

        Ok(())
    }

    /// Look up a source by name
    pub fn source(&self, name: &str) -> Option<&SourceSpec> {
        self.sources.iter().find(|s| s.name == name)
    }

    /// Source names in declaration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.iter().map(|s| s.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
code_name: Dragonfish
apt-repos:
  url: http://deb.debian.org/debian/
sources:
  - name: kernel
    repo: https://github.com/example/linux
    branch: master
    batch_priority: 0
  - name: openzfs
    repo: https://github.com/example/zfs
    branch: release
    kernel_module: true
    env:
      KVERS: "6.6"
  - name: grub
    predepscmd:
      - "./debian/rules pre-build"
  - name: py-libzfs
    subdir: libzfs
    deps_path: debian-extra
    explicit_deps:
      - openzfs
"#;

    #[test]
    fn test_parse_sources_in_order() {
        let manifest = Manifest::from_yaml(SAMPLE).unwrap();
        let names: Vec<_> = manifest.names().collect();
        assert_eq!(names, vec!["kernel", "openzfs", "grub", "py-libzfs"]);
        assert!(manifest.validate().is_ok());
    }

    #[test]
    fn test_unknown_keys_are_preserved() {
        let manifest = Manifest::from_yaml(SAMPLE).unwrap();
        let openzfs = manifest.source("openzfs").unwrap();
        assert!(openzfs.kernel_module);
        assert_eq!(
            openzfs.extra.get("branch"),
            Some(&serde_yaml::Value::String("release".to_string()))
        );
        assert!(openzfs.extra.contains_key("env"));

        let emitted = serde_yaml::to_string(openzfs).unwrap();
        assert!(emitted.contains("github.com/example/zfs"));
        assert!(emitted.contains("kernel_module: true"));
        assert!(!emitted.contains("explicit_deps"));
    }

    #[test]
    fn test_predeps_without_control() {
        let manifest = Manifest::from_yaml(SAMPLE).unwrap();
        assert!(manifest.source("grub").unwrap().needs_predeps_without_control());
        assert!(!manifest.source("kernel").unwrap().needs_predeps_without_control());

        let with_path = SourceSpec::new("x")
            .with_predepscmd("make prep")
            .with_deps_path("pkg");
        assert!(!with_path.needs_predeps_without_control());
    }

    #[test]
    fn test_control_path_conventions() {
        let root = Path::new("/src");
        assert_eq!(
            SourceSpec::new("plain").control_path(root),
            PathBuf::from("/src/plain/debian/control")
        );
        assert_eq!(
            SourceSpec::new("nested").with_subdir("sub").control_path(root),
            PathBuf::from("/src/nested/sub/debian/control")
        );
        assert_eq!(
            SourceSpec::new("custom")
                .with_subdir("sub")
                .with_deps_path("pkg")
                .control_path(root),
            PathBuf::from("/src/custom/sub/pkg/control")
        );
    }

    #[test]
    fn test_duplicate_source_rejected() {
        let manifest = Manifest::new(vec![SourceSpec::new("a"), SourceSpec::new("a")]);
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::DuplicateSource { name }) if name == "a"
        ));
    }

    #[test]
    fn test_unknown_explicit_dependency_rejected() {
        let manifest = Manifest::new(vec![
            SourceSpec::new("a").with_explicit_deps(["missing"]),
        ]);
        assert!(matches!(
            manifest.validate(),
            Err(ManifestError::UnknownExplicitDependency { dependency, .. }) if dependency == "missing"
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = Manifest::load(Path::new("/nonexistent/build.manifest"));
        assert!(matches!(result, Err(ManifestError::NotFound { .. })));
    }
}
