//! CLI command for computing the build plan
//!
//! Implements the `pkgplan plan` command. The plan is a list of batches, each
//! a list of full manifest source records, as YAML (or JSON with `--json`).

use std::path::Path;

use anyhow::{Context, Result};

use crate::cli::commands::PlanInputs;
use crate::cli::output::OutputConfig;
use crate::infra::filesystem;

/// Execute the plan command
pub fn execute(inputs: &PlanInputs, destination: Option<&Path>, output: &OutputConfig) -> Result<()> {
    let (manifest, outcome) = inputs.plan(output)?;
    let batches = outcome.plan.materialize(&manifest);

    let rendered = if output.json {
        let mut json = serde_json::to_string_pretty(&batches).context("Failed to serialize plan")?;
        json.push('\n');
        json
    } else {
        serde_yaml::to_string(&batches).context("Failed to serialize plan")?
    };

    match destination {
        Some(path) => {
            filesystem::write_file(path, &rendered)?;
            output.success(&format!(
                "{} packages in {} batches written to {}",
                outcome.plan.package_count(),
                outcome.plan.len(),
                path.display()
            ));
        }
        None => print!("{rendered}"),
    }

    Ok(())
}
