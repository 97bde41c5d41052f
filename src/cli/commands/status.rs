//! CLI command for reporting rebuild decisions
//!
//! Implements the `pkgplan status` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::commands::PlanInputs;
use crate::cli::output::{status, OutputConfig};
use crate::core::rebuild::{RebuildEntry, RebuildState};
use crate::core::scheduler::BuildPlan;

/// JSON report
#[derive(Debug, Serialize)]
struct StatusReport<'a> {
    parallelism: usize,
    packages: &'a RebuildState,
    batches: &'a BuildPlan,
}

/// Execute the status command
pub fn execute(inputs: &PlanInputs, all: bool, output: &OutputConfig) -> Result<()> {
    let (manifest, outcome) = inputs.plan(output)?;

    if output.json {
        let report = StatusReport {
            parallelism: outcome.parallelism.get(),
            packages: &outcome.state,
            batches: &outcome.plan,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let width = manifest.names().map(str::len).max().unwrap_or(0);
    for name in manifest.names() {
        let Some(entry) = outcome.state.entry(name) else {
            continue;
        };
        if entry.needs_rebuild || all {
            println!("{}", format_entry(name, entry, width));
        }
    }

    if !output.quiet {
        println!(
            "{} {} of {} packages need rebuild, {} batches",
            status::INFO,
            outcome.state.rebuild_set().len(),
            outcome.state.len(),
            outcome.plan.len()
        );
    }
    Ok(())
}

fn format_entry(name: &str, entry: &RebuildEntry, width: usize) -> String {
    let marker = if entry.needs_rebuild { "*" } else { " " };
    format!("{marker} {name:<width$}  {}", entry.reason)
}
