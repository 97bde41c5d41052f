//! Dependency graph construction
//!
//! Turns the manifest plus per-source control metadata into a
//! [`PackageIndex`]: one normalized record per binary package, keyed by the
//! binary package name.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::core::config::PackageRoles;
use crate::core::depends::{normalize_build_depends, normalize_runtime_depends};
use crate::core::manifest::{Manifest, SourceSpec};
use crate::core::metadata::MetadataProvider;
use crate::error::GraphError;

/// Normalized dependency record of one binary package
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageRecord {
    /// Packages needed to build the owning source
    pub build_deps: BTreeSet<String>,
    /// Packages needed at runtime by this binary
    pub install_deps: BTreeSet<String>,
    /// Source package name from the control file
    pub source_package: String,
    /// Owning manifest source
    pub source: String,
    /// Manifest-declared source dependencies
    pub explicit_deps: BTreeSet<String>,
}

impl PackageRecord {
    /// Record for a source modelled as a dependency-free leaf
    pub fn leaf(source: &str) -> Self {
        Self {
            source_package: source.to_string(),
            source: source.to_string(),
            ..Self::default()
        }
    }
}

/// Immutable map of binary package name to its record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageIndex {
    packages: BTreeMap<String, PackageRecord>,
}

impl PackageIndex {
    /// Record for a binary package, if any tracked source produces it
    pub fn get(&self, name: &str) -> Option<&PackageRecord> {
        self.packages.get(name)
    }

    /// Records owned by a manifest source
    pub fn records_for<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a PackageRecord> {
        self.packages.values().filter(move |r| r.source == source)
    }
}

impl FromIterator<(String, PackageRecord)> for PackageIndex {
    fn from_iter<T: IntoIterator<Item = (String, PackageRecord)>>(iter: T) -> Self {
        Self {
            packages: iter.into_iter().collect(),
        }
    }
}

/// Builds a [`PackageIndex`] from a manifest
pub struct GraphBuilder<'a> {
    sources_root: &'a Path,
    roles: &'a PackageRoles,
    metadata: &'a dyn MetadataProvider,
}

impl<'a> GraphBuilder<'a> {
    /// Create a builder reading checkouts under `sources_root`
    pub fn new(
        sources_root: &'a Path,
        roles: &'a PackageRoles,
        metadata: &'a dyn MetadataProvider,
    ) -> Self {
        Self {
            sources_root,
            roles,
            metadata,
        }
    }

    /// Build the package index for every source in the manifest
    pub fn build(&self, manifest: &Manifest) -> Result<PackageIndex, GraphError> {
        let mut packages = BTreeMap::new();

        for source in &manifest.sources {
            let checkout = source.checkout_dir(self.sources_root);
            if !checkout.exists() {
                return Err(GraphError::MissingSourceTree {
                    package: source.name.clone(),
                    path: checkout,
                });
            }

            if self.is_leaf(source) {
                tracing::debug!("Treating '{}' as a dependency-free leaf", source.name);
                if !source.explicit_deps.is_empty() {
                    tracing::warn!(
                        "Ignoring explicit_deps of leaf source '{}'",
                        source.name
                    );
                }
                insert(&mut packages, source.name.clone(), PackageRecord::leaf(&source.name))?;
                continue;
            }

            for (name, record) in self.records_for_source(source)? {
                insert(&mut packages, name, record)?;
            }
        }

        tracing::info!(
            "Indexed {} binary packages from {} sources",
            packages.len(),
            manifest.sources.len()
        );
        Ok(PackageIndex { packages })
    }

    /// Sources whose dependencies cannot be read from a control file
    fn is_leaf(&self, source: &SourceSpec) -> bool {
        self.roles.is_bootstrap(&source.name) || source.needs_predeps_without_control()
    }

    /// Normalized records for every binary package a source produces
    fn records_for_source(
        &self,
        source: &SourceSpec,
    ) -> Result<Vec<(String, PackageRecord)>, GraphError> {
        let control_path = source.control_path(self.sources_root);
        let info = self
            .metadata
            .control_info(&control_path)
            .map_err(|e| GraphError::MetadataResolution {
                package: source.name.clone(),
                path: control_path.clone(),
                source: e,
            })?;

        if info.binary_packages.is_empty() {
            tracing::warn!(
                "Source '{}' produces no binary packages ({})",
                source.name,
                control_path.display()
            );
        }

        let mut build_deps =
            normalize_build_depends(info.source_package.build_depends.as_deref().unwrap_or(""));
        if source.kernel_module {
            build_deps.insert(self.roles.kernel.clone());
        }
        let is_umbrella = self.roles.is_umbrella(&source.name);

        let records = info
            .binary_packages
            .into_iter()
            .map(|binary| {
                let install_deps =
                    normalize_runtime_depends(binary.depends.as_deref().unwrap_or(""));
                let mut record = PackageRecord {
                    build_deps: build_deps.clone(),
                    install_deps,
                    source_package: info.source_package.name.clone(),
                    source: source.name.clone(),
                    explicit_deps: source.explicit_deps.clone(),
                };
                if is_umbrella {
                    record.build_deps.extend(record.install_deps.iter().cloned());
                }
                (binary.name, record)
            })
            .collect();

        Ok(records)
    }
}

/// Insert a record, rejecting binary names produced by two sources
fn insert(
    packages: &mut BTreeMap<String, PackageRecord>,
    name: String,
    record: PackageRecord,
) -> Result<(), GraphError> {
    match packages.entry(name) {
        Entry::Occupied(existing) => Err(GraphError::DuplicateBinaryPackage {
            name: existing.key().clone(),
            first: existing.get().source.clone(),
            second: record.source,
        }),
        Entry::Vacant(slot) => {
            slot.insert(record);
            Ok(())
        }
    }
}
