//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.bestsellers.toml` files.

use crate::cli::OutputFormat;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default configuration file name, looked up in the current directory.
pub const DEFAULT_CONFIG_FILE: &str = ".bestsellers.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Dataset settings.
    #[serde(default)]
    pub dataset: DatasetConfig,

    /// Aggregate thresholds.
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Default output file path.
    #[serde(default = "default_output")]
    pub output: String,

    /// Default report format.
    #[serde(default)]
    pub format: OutputFormat,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            output: default_output(),
            format: OutputFormat::default(),
            verbose: false,
        }
    }
}

fn default_output() -> String {
    "dashboard_report.md".to_string()
}

/// Dataset location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Path to the preprocessed bestsellers CSV.
    #[serde(default = "default_dataset_path")]
    pub path: String,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
        }
    }
}

fn default_dataset_path() -> String {
    "bestsellers_preprocesado.csv".to_string()
}

/// Thresholds used by the aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Authors listed in the most frequent authors ranking.
    #[serde(default = "default_top_authors_limit")]
    pub top_authors_limit: usize,

    /// Minimum years in the ranking for a recurring bestseller.
    #[serde(default = "default_recurring_min_years")]
    pub recurring_min_years: u32,

    /// Minimum appearances to enter the author leaderboard.
    #[serde(default = "default_leaderboard_min_appearances")]
    pub leaderboard_min_appearances: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_authors_limit: default_top_authors_limit(),
            recurring_min_years: default_recurring_min_years(),
            leaderboard_min_appearances: default_leaderboard_min_appearances(),
        }
    }
}

fn default_top_authors_limit() -> usize {
    10
}

fn default_recurring_min_years() -> u32 {
    5
}

fn default_leaderboard_min_appearances() -> usize {
    3
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Include business commentary and hypotheses.
    #[serde(default = "default_true")]
    pub include_commentary: bool,

    /// Default file path for the filtered CSV export.
    #[serde(default = "default_export_path")]
    pub export_path: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            include_commentary: true,
            export_path: default_export_path(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_export_path() -> String {
    crate::report::export::DEFAULT_EXPORT_NAME.to_string()
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
        let default_path = Path::new(DEFAULT_CONFIG_FILE);

        if default_path.exists() {
            Ok(Some(Self::load(default_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings.
    /// This method only overrides config when CLI provides explicit values.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref data) = args.data {
            self.dataset.path = data.display().to_string();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.display().to_string();
        }
        if let Some(format) = args.format {
            self.general.format = format;
        }
        if let Some(limit) = args.top_authors {
            self.analysis.top_authors_limit = limit;
        }
        if let Some(ref export_path) = args.export_path {
            self.report.export_path = export_path.display().to_string();
        }

        // Flags only ever switch their setting one way
        if args.no_commentary {
            self.report.include_commentary = false;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Log level after merging: quiet wins, then verbose from the CLI or the file.
    pub fn log_level(&self, quiet: bool) -> tracing::Level {
        if quiet {
            tracing::Level::ERROR
        } else if self.general.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}
