//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::Genre;
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Bestsellers - filter and aggregate the Amazon bestsellers ranking
///
/// Loads the preprocessed bestsellers CSV, applies a year / genre / price
/// category selection and writes a dashboard report in Markdown or JSON.
///
/// Examples:
///   bestsellers --data bestsellers_preprocesado.csv
///   bestsellers --year 2015 --genre Fiction --price-category Barato,Intermedio
///   bestsellers --year 2019 --format json --output dashboard.json
///   bestsellers --year 2016 --export --export-path fiction_2016.csv
///   bestsellers --list-filters
///   bestsellers --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Path to the preprocessed bestsellers CSV
    ///
    /// Defaults to bestsellers_preprocesado.csv or the [dataset] path in
    /// .bestsellers.toml.
    #[arg(short, long, value_name = "FILE", env = "BESTSELLERS_DATA")]
    pub data: Option<PathBuf>,

    /// Year to analyze
    ///
    /// Defaults to the earliest year in the dataset.
    #[arg(short, long, value_name = "YEAR")]
    pub year: Option<i32>,

    /// Genres to include (comma-separated)
    ///
    /// Example: --genre Fiction,"Non Fiction". Passing the flag with no
    /// value selects no genre at all.
    #[arg(short, long, value_name = "GENRES", value_delimiter = ',', num_args = 0..)]
    pub genre: Option<Vec<Genre>>,

    /// Price categories to include (comma-separated)
    ///
    /// Example: --price-category Barato,Intermedio. Passing the flag with no
    /// value selects no price category at all.
    #[arg(
        short,
        long,
        value_name = "CATEGORIES",
        value_delimiter = ',',
        num_args = 0..
    )]
    pub price_category: Option<Vec<String>>,

    /// Output file path for the report
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output format (markdown, json)
    #[arg(short, long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Export the filtered rows as CSV
    #[arg(short, long)]
    pub export: bool,

    /// File path for the filtered CSV export (implies --export)
    #[arg(long, value_name = "FILE")]
    pub export_path: Option<PathBuf>,

    /// Print the available filter values and exit
    #[arg(long)]
    pub list_filters: bool,

    /// Leave business commentary and hypotheses out of the report
    #[arg(long)]
    pub no_commentary: bool,

    /// Number of authors in the most frequent authors ranking
    #[arg(long, value_name = "COUNT")]
    pub top_authors: Option<usize>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .bestsellers.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Generate a default .bestsellers.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
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

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.top_authors == Some(0) {
            return Err("Top authors must be at least 1".to_string());
        }

        if let Some(ref categories) = self.price_category {
            if categories.iter().any(|c| c.trim().is_empty()) {
                return Err("Price categories must not be empty strings".to_string());
            }
        }

        // Validate dataset path if provided
        if let Some(ref data) = self.data {
            if !data.exists() {
                return Err(format!("Dataset file does not exist: {}", data.display()));
            }
            if !data.is_file() {
                return Err(format!("Dataset path is not a file: {}", data.display()));
            }
        }

        Ok(())
    }

    /// Whether the filtered rows should be exported.
    pub fn wants_export(&self) -> bool {
        self.export || self.export_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_args() -> Args {
        Args {
            data: None,
            year: None,
            genre: None,
            price_category: None,
            output: None,
            format: None,
            export: false,
            export_path: None,
            list_filters: false,
            no_commentary: false,
            top_authors: None,
            config: None,
            verbose: false,
            quiet: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_filters() {
        let args = Args::try_parse_from([
            "bestsellers",
            "--year",
            "2015",
            "--genre",
            "Fiction,Non Fiction",
            "--price-category",
            "Barato,Intermedio",
        ])
        .unwrap();

        assert_eq!(args.year, Some(2015));
        assert_eq!(args.genre, Some(vec![Genre::Fiction, Genre::NonFiction]));
        assert_eq!(
            args.price_category,
            Some(vec!["Barato".to_string(), "Intermedio".to_string()])
        );
    }

    #[test]
    fn test_parse_unknown_genre() {
        let result = Args::try_parse_from(["bestsellers", "--genre", "Poetry"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_empty_genre_selection() {
        let args = Args::try_parse_from(["bestsellers", "--genre", "--year", "2015"]).unwrap();
        assert_eq!(args.genre, Some(vec![]));
        assert_eq!(args.year, Some(2015));
    }

    #[test]
    fn test_parse_format() {
        let args = Args::try_parse_from(["bestsellers", "--format", "json"]).unwrap();
        assert_eq!(args.format, Some(OutputFormat::Json));

        let args = Args::try_parse_from(["bestsellers"]).unwrap();
        assert_eq!(args.format, None);
    }

    #[test]
    fn test_verbose_conflicts_with_quiet() {
        let result = Args::try_parse_from(["bestsellers", "--verbose", "--quiet"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_dataset() {
        let mut args = make_args();
        args.data = Some(PathBuf::from("/nonexistent/bestsellers.csv"));
        let err = args.validate().unwrap_err();
        assert!(err.contains("does not exist"));
    }

    #[test]
    fn test_validation_zero_top_authors() {
        let mut args = make_args();
        args.top_authors = Some(0);
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_skipped_for_init_config() {
        let mut args = make_args();
        args.init_config = true;
        args.top_authors = Some(0);
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_export_path_implies_export() {
        let mut args = make_args();
        assert!(!args.wants_export());

        args.export_path = Some(PathBuf::from("out.csv"));
        assert!(args.wants_export());
    }
}
