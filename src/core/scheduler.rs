//! Build plan scheduling
//!
//! Restricts the dependency graph to packages that need rebuilding, layers it
//! topologically and slices each layer into batches no larger than the
//! parallelism limit. Batches run strictly one after another; members of a
//! batch may run concurrently.

use serde::Serialize;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::num::NonZeroUsize;

use crate::core::manifest::{Manifest, SourceSpec};
use crate::core::rebuild::RebuildState;
use crate::error::SchedulerError;

/// Ordered batches of source package names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BuildPlan {
    batches: Vec<Vec<String>>,
}

impl BuildPlan {
    /// Batches in execution order
    pub fn batches(&self) -> &[Vec<String>] {
        &self.batches
    }

    /// Number of batches
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Whether nothing needs building
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// Total number of scheduled packages
    pub fn package_count(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    /// Index of the batch containing `package`
    pub fn batch_of(&self, package: &str) -> Option<usize> {
        self.batches
            .iter()
            .position(|batch| batch.iter().any(|p| p == package))
    }

    /// Replace names with the full manifest records for the build driver
    pub fn materialize(&self, manifest: &Manifest) -> Vec<Vec<SourceSpec>> {
        let by_name: HashMap<&str, &SourceSpec> = manifest
            .sources
            .iter()
            .map(|source| (source.name.as_str(), source))
            .collect();

        self.batches
            .iter()
            .map(|batch| {
                batch
                    .iter()
                    .filter_map(|name| by_name.get(name.as_str()).map(|s| (*s).clone()))
                    .collect()
            })
            .collect()
    }
}

/// Dependency graph restricted to packages needing rebuild
///
/// Nodes keep manifest order; edges to up-to-date packages are dropped since
/// those need not gate anything.
#[derive(Debug, Default)]
pub struct RebuildGraph {
    nodes: Vec<(String, BTreeSet<String>)>,
}

impl RebuildGraph {
    /// Reduce the rebuild state to the packages needing rebuild
    pub fn from_state(manifest: &Manifest, state: &RebuildState) -> Self {
        let nodes = manifest
            .names()
            .filter_map(|name| state.entry(name).map(|entry| (name, entry)))
            .filter(|(_, entry)| entry.needs_rebuild)
            .map(|(name, entry)| {
                let deps = entry
                    .deps
                    .iter()
                    .filter(|dep| dep.as_str() != name && state.needs_rebuild(dep))
                    .cloned()
                    .collect();
                (name.to_string(), deps)
            })
            .collect();

        Self { nodes }
    }

    #[cfg(test)]
    fn add_package(&mut self, name: &str, dependencies: BTreeSet<String>) {
        self.nodes.push((name.to_string(), dependencies));
    }

    /// Number of packages
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Kahn-style topological layers
    ///
    /// Layer 0 holds packages with no remaining dependency; layer `k` holds
    /// packages whose dependencies all sit in earlier layers. Within a layer,
    /// insertion order is preserved.
    pub fn layers(&self) -> Result<Vec<Vec<String>>, SchedulerError> {
        let known: HashSet<&str> = self.nodes.iter().map(|(name, _)| name.as_str()).collect();
        let mut built: HashSet<&str> = HashSet::new();
        let mut remaining: Vec<(&str, &BTreeSet<String>)> = self
            .nodes
            .iter()
            .map(|(name, deps)| (name.as_str(), deps))
            .collect();
        let mut layers = Vec::new();

        while !remaining.is_empty() {
            let (ready, blocked): (Vec<_>, Vec<_>) = remaining.into_iter().partition(|(_, deps)| {
                deps.iter()
                    .all(|d| built.contains(d.as_str()) || !known.contains(d.as_str()))
            });

            if ready.is_empty() {
                return Err(SchedulerError::CircularDependency {
                    cycle: self.find_cycle(&built),
                });
            }

            built.extend(ready.iter().map(|(name, _)| *name));
            layers.push(ready.iter().map(|(name, _)| (*name).to_string()).collect());
            remaining = blocked;
        }

        Ok(layers)
    }

    /// A dependency cycle among the packages not yet layered
    fn find_cycle(&self, built: &HashSet<&str>) -> Vec<String> {
        let edges: HashMap<&str, &BTreeSet<String>> = self
            .nodes
            .iter()
            .filter(|(name, _)| !built.contains(name.as_str()))
            .map(|(name, deps)| (name.as_str(), deps))
            .collect();

        let mut visited = HashSet::new();
        let mut path = Vec::new();
        for (name, _) in &self.nodes {
            if !edges.contains_key(name.as_str()) {
                continue;
            }
            if let Some(cycle) = visit(name, &edges, &mut visited, &mut path) {
                return cycle;
            }
        }

        // Unreachable for a graph that failed layering
        Vec::new()
    }
}

fn visit<'a>(
    node: &'a str,
    edges: &HashMap<&'a str, &'a BTreeSet<String>>,
    visited: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> Option<Vec<String>> {
    if let Some(start) = path.iter().position(|n| *n == node) {
        let mut cycle: Vec<String> = path[start..].iter().map(ToString::to_string).collect();
        cycle.push(node.to_string());
        return Some(cycle);
    }
    if !visited.insert(node) {
        return None;
    }

    path.push(node);
    if let Some(&deps) = edges.get(node) {
        for dep in deps {
            if edges.contains_key(dep.as_str()) {
                if let Some(cycle) = visit(dep, edges, visited, path) {
                    return Some(cycle);
                }
            }
        }
    }
    path.pop();

    None
}

/// Schedule every package needing rebuild into bounded batches
pub fn schedule(
    manifest: &Manifest,
    state: &RebuildState,
    parallelism: NonZeroUsize,
) -> Result<BuildPlan, SchedulerError> {
    let graph = RebuildGraph::from_state(manifest, state);
    let layers = graph.layers()?;

    let batches: Vec<Vec<String>> = layers
        .iter()
        .flat_map(|layer| layer.chunks(parallelism.get()).map(<[String]>::to_vec))
        .collect();

    tracing::info!(
        "Scheduled {} packages in {} layers, {} batches (limit {})",
        graph.len(),
        layers.len(),
        batches.len(),
        parallelism
    );
    Ok(BuildPlan { batches })
}
