//! Transitive dependency closure
//!
//! Expands each source's direct build dependencies (binary package names) into
//! the full set of tracked source packages it needs, following both runtime
//! and build dependencies of every package reached.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::core::graph::PackageIndex;
use crate::core::manifest::Manifest;

/// Source name to the set of source names it transitively depends on
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DependencyClosure {
    deps: BTreeMap<String, BTreeSet<String>>,
}

impl DependencyClosure {
    /// Resolve the closure of every manifest source
    ///
    /// A source's closure is the union, over all binary packages it produces,
    /// of the sources reachable from their build dependencies, plus the
    /// manifest's explicit dependencies. A source never depends on itself.
    pub fn resolve(manifest: &Manifest, index: &PackageIndex) -> Self {
        let deps = manifest
            .sources
            .iter()
            .map(|source| {
                let mut closure = BTreeSet::new();
                for record in index.records_for(&source.name) {
                    closure.extend(closure_of(index, &record.build_deps));
                    closure.extend(record.explicit_deps.iter().cloned());
                }
                closure.remove(&source.name);
                (source.name.clone(), closure)
            })
            .collect();

        Self { deps }
    }

    /// Closure of one source
    pub fn get(&self, source: &str) -> Option<&BTreeSet<String>> {
        self.deps.get(source)
    }

    /// Sources whose closure contains `source`
    pub fn consumers_of(&self, source: &str) -> BTreeSet<&str> {
        self.deps
            .iter()
            .filter(|(_, deps)| deps.contains(source))
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

impl FromIterator<(String, BTreeSet<String>)> for DependencyClosure {
    fn from_iter<T: IntoIterator<Item = (String, BTreeSet<String>)>>(iter: T) -> Self {
        Self {
            deps: iter.into_iter().collect(),
        }
    }
}

/// Owning sources of everything reachable from `roots`
///
/// Names no tracked source produces are external packages and are skipped.
/// Each binary package is expanded at most once, so cyclic declarations
/// terminate; a revisit counts as already satisfied.
pub fn closure_of<'a, I>(index: &PackageIndex, roots: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = &'a String>,
{
    let mut result = BTreeSet::new();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut frontier: Vec<&str> = roots.into_iter().map(String::as_str).collect();

    while let Some(name) = frontier.pop() {
        let Some(record) = index.get(name) else {
            continue;
        };
        if !visited.insert(name) {
            continue;
        }

        result.insert(record.source.clone());
        frontier.extend(
            record
                .install_deps
                .iter()
                .chain(&record.build_deps)
                .map(String::as_str),
        );
    }

    result
}
