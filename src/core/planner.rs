//! Planning pipeline
//!
//! Runs the planning phases in order: index the manifest's binary packages,
//! resolve each source's closure, decide what changed, propagate and schedule.

use std::num::NonZeroUsize;
use std::path::Path;

use crate::core::closure::DependencyClosure;
use crate::core::config::{PackageRoles, PlannerConfig};
use crate::core::graph::{GraphBuilder, PackageIndex};
use crate::core::manifest::Manifest;
use crate::core::metadata::MetadataProvider;
use crate::core::propagate::propagate;
use crate::core::rebuild::{HashStore, RebuildDecider, RebuildState, VersionControl};
use crate::core::scheduler::{schedule, BuildPlan};
use crate::error::PlanError;

/// Everything computed during one planning run
#[derive(Debug, Clone)]
pub struct PlanOutcome {
    /// Binary package records
    pub index: PackageIndex,
    /// Source closures
    pub closure: DependencyClosure,
    /// Final rebuild decisions, after propagation
    pub state: RebuildState,
    /// Scheduled batches
    pub plan: BuildPlan,
    /// Batch size limit the plan was built with
    pub parallelism: NonZeroUsize,
}

/// One-shot build planner over a sources root
pub struct Planner<'a> {
    roles: &'a PackageRoles,
    parallelism: NonZeroUsize,
    sources_root: &'a Path,
    metadata: &'a dyn MetadataProvider,
    vcs: &'a dyn VersionControl,
    hashes: &'a dyn HashStore,
}

impl<'a> Planner<'a> {
    /// Create a planner
    ///
    /// Fails if the configured parallelism is invalid.
    pub fn new(
        config: &'a PlannerConfig,
        sources_root: &'a Path,
        metadata: &'a dyn MetadataProvider,
        vcs: &'a dyn VersionControl,
        hashes: &'a dyn HashStore,
    ) -> Result<Self, PlanError> {
        Ok(Self {
            roles: &config.packages,
            parallelism: config.parallelism()?,
            sources_root,
            metadata,
            vcs,
            hashes,
        })
    }

    /// Batch size limit in effect
    pub fn parallelism(&self) -> NonZeroUsize {
        self.parallelism
    }

    /// Index the manifest and resolve every source's closure
    pub fn resolve(&self, manifest: &Manifest) -> Result<(PackageIndex, DependencyClosure), PlanError> {
        let index = GraphBuilder::new(self.sources_root, self.roles, self.metadata).build(manifest)?;
        let closure = DependencyClosure::resolve(manifest, &index);
        Ok((index, closure))
    }

    /// Run the full pipeline
    pub fn plan(&self, manifest: &Manifest) -> Result<PlanOutcome, PlanError> {
        let (index, closure) = self.resolve(manifest)?;

        let decider = RebuildDecider::new(self.sources_root, self.roles, self.vcs, self.hashes);
        let state = propagate(decider.decide(manifest, &closure)?);

        let plan = schedule(manifest, &state, self.parallelism)?;

        Ok(PlanOutcome {
            index,
            closure,
            state,
            plan,
            parallelism: self.parallelism,
        })
    }
}
