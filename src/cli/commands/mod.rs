//! CLI command implementations
//!
//! Each command is implemented in its own submodule. All of them read the
//! same inputs, described by [`PlanInputs`].

pub mod deps;
pub mod plan;
pub mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use crate::cli::output::OutputConfig;
use crate::config::defaults::{DEFAULT_HASH_DIR, DEFAULT_MANIFEST_PATH, DEFAULT_SOURCES_DIR};
use crate::core::config::PlannerConfig;
use crate::core::manifest::Manifest;
use crate::core::planner::{PlanOutcome, Planner};
use crate::infra::dirs::PlannerDirs;
use crate::infra::git::GixVersionControl;
use crate::infra::hashes::HashDir;
use crate::infra::metadata::CommandMetadataProvider;

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the build plan
    Plan {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Write the plan here instead of stdout
        #[arg(short, long, env = "PKG_BUILD_MANIFEST")]
        output: Option<PathBuf>,
    },

    /// Show which packages need rebuilding and why
    Status {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Also list up-to-date packages
        #[arg(short, long)]
        all: bool,
    },

    /// Show the dependency closure of a source package
    Deps {
        #[command(flatten)]
        inputs: PlanInputs,

        /// Source package name
        source: String,

        /// List packages depending on the source instead
        #[arg(short, long)]
        reverse: bool,
    },
}

impl Commands {
    pub fn run(self, output: &OutputConfig) -> Result<()> {
        match self {
            Self::Plan {
                inputs,
                output: destination,
            } => plan::execute(&inputs, destination.as_deref(), output),
            Self::Status { inputs, all } => status::execute(&inputs, all, output),
            Self::Deps {
                inputs,
                source,
                reverse,
            } => deps::execute(&inputs, &source, reverse, output),
        }
    }
}

/// Inputs shared by every command
#[derive(Args, Debug, Clone)]
pub struct PlanInputs {
    /// Build manifest
    #[arg(short, long, env = "MANIFEST", default_value = DEFAULT_MANIFEST_PATH)]
    pub manifest: PathBuf,

    /// Directory holding one checkout per source
    #[arg(short, long, env = "SOURCES", default_value = DEFAULT_SOURCES_DIR)]
    pub sources: PathBuf,

    /// Directory holding `<source>.hash` records of the last builds
    #[arg(long, env = "HASH_DIR", default_value = DEFAULT_HASH_DIR)]
    pub hash_dir: PathBuf,

    /// Maximum packages per batch
    #[arg(short = 'j', long, env = "PARALLEL_BUILDS")]
    pub parallel_builds: Option<usize>,

    /// Serial mode: one package per batch
    #[arg(
        long,
        env = "PKG_DEBUG",
        action = clap::ArgAction::SetTrue,
        value_parser = is_set
    )]
    pub debug: bool,

    /// Command turning a control file into JSON
    #[arg(long, env = "PKGPLAN_METADATA_COMMAND")]
    pub metadata_command: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long, env = "PKGPLAN_CONFIG")]
    pub config: Option<PathBuf>,
}

impl PlanInputs {
    /// Load the config file and apply command-line overrides
    pub fn load_config(&self) -> Result<PlannerConfig> {
        let path = self
            .config
            .clone()
            .unwrap_or_else(|| PlannerDirs::new().global_config_path());
        let mut config = PlannerConfig::load_from_path(&path)?;

        if let Some(limit) = self.parallel_builds {
            config.planner.parallel_builds = Some(limit);
        }
        if self.debug {
            config.planner.debug = Some(true);
        }
        if let Some(command) = &self.metadata_command {
            config.metadata.command = Some(command.clone());
        }

        Ok(config)
    }

    /// Load and validate the manifest
    pub fn load_manifest(&self) -> Result<Manifest> {
        Manifest::load(&self.manifest)
            .with_context(|| format!("Cannot plan from '{}'", self.manifest.display()))
    }

    /// Run the full planning pipeline
    pub fn plan(&self, output: &OutputConfig) -> Result<(Manifest, PlanOutcome)> {
        let config = self.load_config()?;
        let manifest = self.load_manifest()?;

        let metadata = CommandMetadataProvider::new(config.metadata_command());
        let vcs = GixVersionControl::new();
        let hashes = HashDir::new(&self.hash_dir);
        let planner = Planner::new(&config, &self.sources, &metadata, &vcs, &hashes)?;

        let spinner = output.spinner(&format!("Planning {} sources...", manifest.sources.len()));
        let outcome = planner.plan(&manifest);
        spinner.finish_and_clear();

        Ok((manifest, outcome?))
    }
}

/// Any non-empty value switches a flag on, matching how the build driver reads it
fn is_set(value: &str) -> Result<bool, std::convert::Infallible> {
    Ok(!value.is_empty())
}
