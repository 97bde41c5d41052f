//! Rebuild propagation
//!
//! A package has to be rebuilt whenever anything it depends on is rebuilt.
//! Marks spread over the reverse dependency graph until a fixed point.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::core::rebuild::{RebuildReason, RebuildState};

/// Propagate `needs_rebuild` to every transitive consumer
///
/// Uses a worklist seeded with every package already marked, so the result
/// does not depend on iteration order.
pub fn propagate(mut state: RebuildState) -> RebuildState {
    let consumers = reverse_dependencies(&state);

    let mut worklist: VecDeque<String> = state
        .rebuild_set()
        .into_iter()
        .map(ToString::to_string)
        .collect();

    while let Some(package) = worklist.pop_front() {
        let Some(dependents) = consumers.get(&package) else {
            continue;
        };
        for dependent in dependents {
            let reason = RebuildReason::Dependency {
                via: package.clone(),
            };
            if state.mark(dependent, reason) {
                tracing::debug!("{dependent}: rebuilding because '{package}' rebuilds");
                worklist.push_back(dependent.clone());
            }
        }
    }

    tracing::info!(
        "{} of {} packages need rebuild",
        state.rebuild_set().len(),
        state.len()
    );
    state
}

/// Map each package to the packages whose closure contains it
fn reverse_dependencies(state: &RebuildState) -> BTreeMap<String, BTreeSet<String>> {
    let mut consumers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (package, entry) in state.iter() {
        for dep in &entry.deps {
            consumers
                .entry(dep.clone())
                .or_default()
                .insert(package.to_string());
        }
    }
    consumers
}
