//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::config::MAX_CHART_WIDTH;
use clap::Parser;
use std::path::PathBuf;

/// Feedback Funnel - AI-powered sentiment & category analysis
///
/// Fetches classified customer feedback from the Feedback Funnel API and
/// renders summary cards, a category breakdown, the sentiment distribution
/// and the recent feedback table.
///
/// Examples:
///   feedback-funnel
///   feedback-funnel --api-url http://localhost:8080/api --format markdown -o feedback.md
///   feedback-funnel --format json
///   feedback-funnel --interactive
///   feedback-funnel --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Base URL of the Feedback Funnel API
    ///
    /// The dashboard requests `<URL>/feedback`. Defaults to the config file
    /// value or http://localhost:8080/api.
    #[arg(long, value_name = "URL", env = "FEEDBACK_API_URL")]
    pub api_url: Option<String>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .feedback-funnel.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format (terminal, markdown, json)
    #[arg(long, default_value = "terminal", value_name = "FORMAT")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Request timeout in seconds (no timeout by default)
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Keep the dashboard open and accept refresh/retry commands on stdin
    #[arg(short, long)]
    pub interactive: bool,

    /// Width of the charts in columns
    #[arg(long, value_name = "COLS")]
    pub chart_width: Option<usize>,

    /// Maximum characters of feedback content per table row
    #[arg(long, value_name = "CHARS")]
    pub content_width: Option<usize>,

    /// Omit the feedback table
    #[arg(long)]
    pub no_table: bool,

    /// Disable coloured output
    #[arg(long)]
    pub no_color: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .feedback-funnel.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Styled terminal output (default)
    #[default]
    Terminal,
    /// Markdown format
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.chart_width == Some(0) || self.content_width == Some(0) {
            return Err("Chart and content widths must be at least 1".to_string());
        }

        if self.chart_width.is_some_and(|width| width > MAX_CHART_WIDTH) {
            return Err(format!("Chart width must be at most {} columns", MAX_CHART_WIDTH));
        }

        if self.interactive && self.output.is_some() {
            return Err("--output cannot be combined with --interactive".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}
