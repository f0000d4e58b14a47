//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.feedback-funnel.toml` files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".feedback-funnel.toml";

/// Widest chart the renderers will draw, in columns.
pub const MAX_CHART_WIDTH: usize = 500;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Feedback API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Report rendering settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// Feedback API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the API; the dashboard requests `{base_url}/feedback`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds. No timeout when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_seconds: None,
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

/// Report rendering settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Width of the category bars and the sentiment bar, in columns.
    #[serde(default = "default_chart_width")]
    pub chart_width: usize,

    /// Maximum characters of feedback content shown per table row.
    #[serde(default = "default_content_width")]
    pub content_width: usize,

    /// Render the feedback table.
    #[serde(default = "default_true")]
    pub show_table: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            chart_width: default_chart_width(),
            content_width: default_content_width(),
            show_table: true,
        }
    }
}

fn default_chart_width() -> usize {
    40
}

fn default_content_width() -> usize {
    60
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.feedback-funnel.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence, but only when given explicitly.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref url) = args.api_url {
            self.api.base_url = url.clone();
        }
        if let Some(timeout) = args.timeout {
            self.api.timeout_seconds = Some(timeout);
        }

        if let Some(width) = args.chart_width {
            self.report.chart_width = width;
        }
        if let Some(width) = args.content_width {
            self.report.content_width = width;
        }
        if args.no_table {
            self.report.show_table = false;
        }
    }

    /// Check values that may have come from the file rather than the CLI.
    pub fn validate(&self) -> Result<()> {
        let url = &self.api.base_url;
        if !url.starts_with("http://") && !url.starts_with("https://") {
            bail!("API URL must start with 'http://' or 'https://': {}", url);
        }
        if self.api.timeout_seconds == Some(0) {
            bail!("API timeout must be at least 1 second");
        }
        if self.report.chart_width == 0 || self.report.content_width == 0 {
            bail!("Chart and content widths must be at least 1");
        }
        if self.report.chart_width > MAX_CHART_WIDTH {
            bail!("Chart width must be at most {} columns", MAX_CHART_WIDTH);
        }
        Ok(())
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
