//! CLI command for inspecting dependency closures
//!
//! Implements the `pkgplan deps` command. Only metadata is read; version
//! control and hash records are not consulted.

use std::collections::BTreeSet;

use anyhow::{bail, Result};

use crate::cli::commands::PlanInputs;
use crate::cli::output::OutputConfig;
use crate::core::planner::Planner;
use crate::infra::git::GixVersionControl;
use crate::infra::hashes::HashDir;
use crate::infra::metadata::CommandMetadataProvider;

/// Execute the deps command
pub fn execute(inputs: &PlanInputs, source: &str, reverse: bool, output: &OutputConfig) -> Result<()> {
    let config = inputs.load_config()?;
    let manifest = inputs.load_manifest()?;
    if manifest.source(source).is_none() {
        bail!("Source '{source}' is not in {}", inputs.manifest.display());
    }

    let metadata = CommandMetadataProvider::new(config.metadata_command());
    let vcs = GixVersionControl::new();
    let hashes = HashDir::new(&inputs.hash_dir);
    let planner = Planner::new(&config, &inputs.sources, &metadata, &vcs, &hashes)?;

    let spinner = output.spinner("Resolving dependencies...");
    let resolved = planner.resolve(&manifest);
    spinner.finish_and_clear();
    let (_, closure) = resolved?;

    let names: BTreeSet<&str> = if reverse {
        closure.consumers_of(source)
    } else {
        closure
            .get(source)
            .map(|deps| deps.iter().map(String::as_str).collect())
            .unwrap_or_default()
    };

    // Manifest order, like the plan
    let ordered: Vec<&str> = manifest.names().filter(|n| names.contains(n)).collect();

    if output.json {
        println!("{}", serde_json::to_string_pretty(&ordered)?);
    } else {
        for name in ordered {
            println!("{name}");
        }
    }
    Ok(())
}
