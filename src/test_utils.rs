//! Test utilities
//!
//! Proptest generators plus in-memory fakes for the metadata, version control
//! and hash record ports.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a valid package name (lowercase alphanumeric with hyphens)
    pub fn package_name() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9-]{0,30}[a-z0-9]?".prop_filter("Name must not be empty", |s| !s.is_empty())
    }

    /// Generate a full commit hash (40 hex characters)
    pub fn commit_sha() -> impl Strategy<Value = String> {
        "[0-9a-f]{40}"
    }

    /// Generate an acyclic dependency layout over `max_nodes` packages
    ///
    /// Package `i` may only depend on packages with a lower index, so the
    /// result is always a DAG. Each entry is the list of dependency indices.
    pub fn dag(max_nodes: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
        (1..=max_nodes).prop_flat_map(|n| {
            (0..n)
                .map(|i| proptest::sample::subsequence((0..i).collect::<Vec<_>>(), 0..=i))
                .collect::<Vec<_>>()
        })
    }
}

#[cfg(test)]
pub mod fakes {
    use std::collections::{HashMap, HashSet};
    use std::path::{Path, PathBuf};

    use tempfile::TempDir;

    use crate::core::manifest::SourceSpec;
    use crate::core::metadata::{ControlInfo, MetadataProvider};
    use crate::core::rebuild::{HashStore, VersionControl};
    use crate::error::{FilesystemError, MetadataError, VersionControlError};

    /// Metadata provider serving canned control info by path
    #[derive(Debug, Default)]
    pub struct FakeMetadata {
        controls: HashMap<PathBuf, ControlInfo>,
    }

    impl FakeMetadata {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_control(mut self, path: &Path, info: ControlInfo) -> Self {
            self.controls.insert(path.to_path_buf(), info);
            self
        }
    }

    impl MetadataProvider for FakeMetadata {
        fn control_info(&self, control_path: &Path) -> Result<ControlInfo, MetadataError> {
            self.controls
                .get(control_path)
                .cloned()
                .ok_or_else(|| MetadataError::ControlFileMissing {
                    path: control_path.to_path_buf(),
                })
        }
    }

    /// Version control fake keyed by checkout path
    #[derive(Debug, Default)]
    pub struct FakeVcs {
        commits: HashMap<PathBuf, String>,
        dirty: HashSet<PathBuf>,
    }

    impl FakeVcs {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_commit(&mut self, checkout: &Path, sha: &str) {
            self.commits.insert(checkout.to_path_buf(), sha.to_string());
        }

        pub fn set_dirty(&mut self, checkout: &Path) {
            self.dirty.insert(checkout.to_path_buf());
        }
    }

    impl VersionControl for FakeVcs {
        fn head_commit(&self, checkout: &Path) -> Result<String, VersionControlError> {
            self.commits
                .get(checkout)
                .cloned()
                .ok_or_else(|| VersionControlError::InvalidRepository {
                    path: checkout.to_path_buf(),
                    error: "not a git repository".to_string(),
                })
        }

        fn is_dirty(&self, checkout: &Path) -> Result<bool, VersionControlError> {
            if !self.commits.contains_key(checkout) {
                return Err(VersionControlError::InvalidRepository {
                    path: checkout.to_path_buf(),
                    error: "not a git repository".to_string(),
                });
            }
            Ok(self.dirty.contains(checkout))
        }
    }

    /// Hash records held in memory
    #[derive(Debug, Default)]
    pub struct MemoryHashStore {
        records: HashMap<String, String>,
    }

    impl MemoryHashStore {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn record(&mut self, package: &str, sha: &str) {
            self.records.insert(package.to_string(), sha.to_string());
        }
    }

    impl HashStore for MemoryHashStore {
        fn last_built(&self, package: &str) -> Result<Option<String>, FilesystemError> {
            Ok(self.records.get(package).cloned())
        }
    }

    /// Temporary sources root with one checkout directory per name
    pub struct SourceTree {
        dir: TempDir,
    }

    impl SourceTree {
        pub fn new(names: &[&str]) -> Self {
            let dir = TempDir::new().expect("Failed to create temp directory");
            for name in names {
                std::fs::create_dir_all(dir.path().join(name))
                    .expect("Failed to create checkout directory");
            }
            Self { dir }
        }

        pub fn root(&self) -> &Path {
            self.dir.path()
        }

        pub fn checkout(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        pub fn control_path(&self, spec: &SourceSpec) -> PathBuf {
            spec.control_path(self.dir.path())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use crate::config::defaults::MIN_PROPTEST_ITERATIONS;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(MIN_PROPTEST_ITERATIONS))]

        #[test]
        fn test_package_name_generator(name in package_name()) {
            prop_assert!(!name.is_empty());
            prop_assert!(name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
        }

        #[test]
        fn test_commit_sha_generator(sha in commit_sha()) {
            prop_assert_eq!(sha.len(), 40);
            prop_assert!(sha.chars().all(|c| c.is_ascii_hexdigit()));
        }

        #[test]
        fn test_dag_generator_only_points_backwards(layout in dag(12)) {
            for (i, deps) in layout.iter().enumerate() {
                prop_assert!(deps.iter().all(|&d| d < i));
            }
        }
    }
}
