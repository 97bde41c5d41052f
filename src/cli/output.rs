//! Output formatting and progress indicators
//!
//! Plans and reports go to stdout; progress, status lines and logs go to
//! stderr so stdout stays machine-readable.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for operations with unknown duration
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.blue} {msg}")
            .expect("Invalid spinner template"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(80));
    pb
}

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Global output flags
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutputConfig {
    /// Only errors are shown
    pub quiet: bool,
    /// Machine-readable output
    pub json: bool,
    /// Verbosity level (`-v` count)
    pub verbose: u8,
}

impl OutputConfig {
    /// Create output settings from the global flags
    pub fn new(quiet: bool, json: bool, verbose: u8) -> Self {
        Self {
            quiet,
            json,
            verbose,
        }
    }

    /// Whether spinners and status lines may be drawn
    pub fn show_progress(&self) -> bool {
        !self.quiet && !self.json
    }

    /// Log filter used when `RUST_LOG` is not set
    pub fn log_filter(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    /// Spinner that is hidden unless progress output is enabled
    pub fn spinner(&self, message: &str) -> ProgressBar {
        if self.show_progress() {
            create_spinner(message)
        } else {
            ProgressBar::hidden()
        }
    }

    /// Print a success line on stderr
    pub fn success(&self, message: &str) {
        if self.show_progress() {
            eprintln!("{} {message}", status::SUCCESS);
        }
    }
}

/// Print an error and its causes on stderr
///
/// Causes already spelled out in the message are not repeated.
pub fn display_error(error: &anyhow::Error) {
    let message = error.to_string();
    eprintln!("{} {message}", status::ERROR);

    for cause in error.chain().skip(1) {
        let cause = cause.to_string();
        if !message.contains(&cause) {
            eprintln!("  caused by: {cause}");
        }
    }
}
