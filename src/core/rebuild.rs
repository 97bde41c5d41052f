//! Rebuild decisions
//!
//! Classifies every source as changed or unchanged since its last recorded
//! build, by comparing the checkout's current commit with the hash record left
//! behind by the last successful build.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::Path;

use crate::core::closure::DependencyClosure;
use crate::core::config::PackageRoles;
use crate::core::manifest::Manifest;
use crate::error::{FilesystemError, RebuildError, VersionControlError};

/// Version control port
pub trait VersionControl {
    /// Commit currently checked out in `checkout`
    fn head_commit(&self, checkout: &Path) -> Result<String, VersionControlError>;

    /// Whether tracked files in `checkout` have uncommitted modifications
    fn is_dirty(&self, checkout: &Path) -> Result<bool, VersionControlError>;
}

/// Read-only store of last-built commit identifiers
pub trait HashStore {
    /// Commit the package was last built from, `None` if never built
    fn last_built(&self, package: &str) -> Result<Option<String>, FilesystemError>;
}

/// Why a package is (or is not) scheduled
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum RebuildReason {
    /// Umbrella package, always rebuilt
    Umbrella,
    /// No hash record exists
    NeverBuilt,
    /// Checkout moved to a different commit
    CommitChanged { previous: String, current: String },
    /// Same commit but uncommitted changes in the working tree
    DirtyTree,
    /// A dependency is being rebuilt
    Dependency { via: String },
    /// Nothing changed
    UpToDate,
}

impl fmt::Display for RebuildReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Umbrella => write!(f, "umbrella package"),
            Self::NeverBuilt => write!(f, "never built"),
            Self::CommitChanged { previous, current } => {
                write!(f, "commit changed {} -> {}", short(previous), short(current))
            }
            Self::DirtyTree => write!(f, "uncommitted changes"),
            Self::Dependency { via } => write!(f, "dependency '{via}' rebuilds"),
            Self::UpToDate => write!(f, "up to date"),
        }
    }
}

fn short(sha: &str) -> &str {
    sha.get(..12).unwrap_or(sha)
}

/// Rebuild decision for one source package
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RebuildEntry {
    /// Whether the package has to be rebuilt
    pub needs_rebuild: bool,
    /// Why
    pub reason: RebuildReason,
    /// Full dependency closure of the package
    pub deps: BTreeSet<String>,
}

/// Rebuild decisions for every source package
///
/// `needs_rebuild` only ever goes from `false` to `true`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RebuildState {
    entries: BTreeMap<String, RebuildEntry>,
}

impl RebuildState {
    /// Insert the initial decision for a package
    pub fn insert(&mut self, package: impl Into<String>, reason: RebuildReason, deps: BTreeSet<String>) {
        let needs_rebuild = reason != RebuildReason::UpToDate;
        self.entries.insert(
            package.into(),
            RebuildEntry {
                needs_rebuild,
                reason,
                deps,
            },
        );
    }

    /// Mark a package as needing rebuild
    ///
    /// Returns `true` if the mark is new. Packages already marked keep their
    /// original reason.
    pub fn mark(&mut self, package: &str, reason: RebuildReason) -> bool {
        match self.entries.get_mut(package) {
            Some(entry) if !entry.needs_rebuild => {
                entry.needs_rebuild = true;
                entry.reason = reason;
                true
            }
            _ => false,
        }
    }

    /// Decision for a package
    pub fn entry(&self, package: &str) -> Option<&RebuildEntry> {
        self.entries.get(package)
    }

    /// Whether a package needs rebuild (unknown packages do not)
    pub fn needs_rebuild(&self, package: &str) -> bool {
        self.entries.get(package).is_some_and(|e| e.needs_rebuild)
    }

    /// Names of all packages needing rebuild
    pub fn rebuild_set(&self) -> BTreeSet<&str> {
        self.entries
            .iter()
            .filter(|(_, e)| e.needs_rebuild)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    /// All decisions, ordered by package name
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RebuildEntry)> {
        self.entries.iter().map(|(name, entry)| (name.as_str(), entry))
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no package is tracked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Decides, per source, whether its checkout changed since the last build
pub struct RebuildDecider<'a> {
    sources_root: &'a Path,
    roles: &'a PackageRoles,
    vcs: &'a dyn VersionControl,
    hashes: &'a dyn HashStore,
}

impl<'a> RebuildDecider<'a> {
    /// Create a decider for checkouts under `sources_root`
    pub fn new(
        sources_root: &'a Path,
        roles: &'a PackageRoles,
        vcs: &'a dyn VersionControl,
        hashes: &'a dyn HashStore,
    ) -> Self {
        Self {
            sources_root,
            roles,
            vcs,
            hashes,
        }
    }

    /// Classify every manifest source
    pub fn decide(
        &self,
        manifest: &Manifest,
        closure: &DependencyClosure,
    ) -> Result<RebuildState, RebuildError> {
        let mut state = RebuildState::default();

        for source in &manifest.sources {
            let reason = self.reason_for(&source.name, &source.checkout_dir(self.sources_root))?;
            tracing::debug!("{}: {}", source.name, reason);
            let deps = closure.get(&source.name).cloned().unwrap_or_default();
            state.insert(source.name.clone(), reason, deps);
        }

        Ok(state)
    }

    fn reason_for(&self, package: &str, checkout: &Path) -> Result<RebuildReason, RebuildError> {
        if self.roles.is_umbrella(package) {
            return Ok(RebuildReason::Umbrella);
        }

        let previous = self
            .hashes
            .last_built(package)
            .map_err(|e| RebuildError::HashRecord {
                package: package.to_string(),
                source: e,
            })?;
        let Some(previous) = previous else {
            return Ok(RebuildReason::NeverBuilt);
        };

        let vcs_error = |e| RebuildError::VersionControl {
            package: package.to_string(),
            source: e,
        };

        let current = self.vcs.head_commit(checkout).map_err(vcs_error)?;
        if current != previous {
            return Ok(RebuildReason::CommitChanged { previous, current });
        }

        if self.vcs.is_dirty(checkout).map_err(vcs_error)? {
            Ok(RebuildReason::DirtyTree)
        } else {
            Ok(RebuildReason::UpToDate)
        }
    }
}
