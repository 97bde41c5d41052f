//! pkgplan CLI - Incremental build planner for OS source packages
//!
//! Entry point for the pkgplan command-line application.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use pkgplan::cli::output::display_error;
use pkgplan::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = cli.output();

    // RUST_LOG wins over -v/-q
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(output.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // Run the command and handle errors
    match cli.run() {
        Ok(()) => Ok(()),
        Err(e) => {
            display_error(&e);
            std::process::exit(1);
        }
    }
}
