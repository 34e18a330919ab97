//! Bestsellers - Amazon bestsellers dashboard
//!
//! A CLI tool that loads the preprocessed bestsellers CSV, applies a
//! year / genre / price category selection and writes a dashboard report
//! with aggregates and business commentary.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (invalid arguments, config, unreadable dataset, unknown filter value, etc.)

mod analysis;
mod cli;
mod config;
mod dataset;
mod models;
mod report;

use analysis::{AnalysisSettings, Dashboard};
use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::{Config, DEFAULT_CONFIG_FILE};
use dataset::{Dataset, FilterState};
use models::{Report, ReportMetadata};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Load configuration before logging so the file can turn on verbose output
    let (mut config, source) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("\n❌ Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    // Initialize logging
    let level = config.log_level(args.quiet);
    let filter = log_filter(level, std::env::var("RUST_LOG").ok().as_deref());
    if let Err(e) = init_logging(filter) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }

    info!("Bestsellers v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    source.log();

    if let Err(e) = run(args, config) {
        error!("Dashboard failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .bestsellers.toml.
fn handle_init_config() -> Result<()> {
    let path = Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize the dataset path, thresholds and report output.");
    Ok(())
}

/// Level filter for the subscriber. `RUST_LOG` directives, when set, take
/// precedence over the level from the flags and config.
fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Initialize logging with the given filter.
fn init_logging(filter: EnvFilter) -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")
}

/// Run the complete load, filter, render and report workflow.
fn run(args: Args, config: Config) -> Result<()> {
    let start_time = Instant::now();

    // Step 1: Load the dataset
    let dataset_path = PathBuf::from(&config.dataset.path);
    println!("📥 Loading dataset: {}", dataset_path.display());

    let dataset = Dataset::load(&dataset_path, !args.quiet)
        .with_context(|| format!("Failed to load dataset {}", dataset_path.display()))?;

    if dataset.is_empty() {
        warn!("Dataset {} has no rows", dataset_path.display());
    }

    let dashboard = Dashboard::new(&dataset, AnalysisSettings::from(&config));

    // Handle --list-filters: show filter values and exit
    if args.list_filters {
        print_filter_options(&dashboard);
        return Ok(());
    }

    // Step 2: Resolve the selection
    let filters = FilterState::from_selection(
        dashboard.options(),
        args.year,
        args.genre.clone(),
        args.price_category.clone(),
    )
    .context("Invalid filter selection")?;

    println!("🔎 Applying filters...");
    println!("   Year: {}", describe_year(filters.year));
    println!("   Genres: {}", describe_list(&filters.genres));
    println!(
        "   Price categories: {}",
        describe_list(&filters.price_categories)
    );

    // Step 3: Compute the dashboard
    println!("\n📊 Computing aggregates...");
    let model = dashboard.render(&filters);

    // Step 4: Build and save the report
    println!("📝 Generating report...");

    let metadata = ReportMetadata {
        dataset_path: dataset_path.display().to_string(),
        generated_at: Utc::now(),
        total_records: dataset.len(),
        filtered_records: model.summary.book_count,
    };

    let report = Report {
        metadata,
        dashboard: model,
    };

    let output = match config.general.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    let output_path = PathBuf::from(&config.general.output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Step 5: Optional filtered export
    let export_path = if args.wants_export() {
        let path = PathBuf::from(&config.report.export_path);
        let view = dashboard.filtered(&filters);
        if view.is_empty() {
            warn!("No rows match the filters; the export only has the header");
        }
        report::export::write_filtered_csv(&view, &path)?;
        Some(path)
    } else {
        None
    };

    // Print summary
    let summary = &report.dashboard.summary;
    println!("\n📊 Dashboard Summary:");
    println!(
        "   Books selected: {} of {}",
        summary.book_count,
        dataset.len()
    );
    println!(
        "   Avg price: {} | Avg rating: {} | Avg reviews: {}",
        summary
            .avg_price
            .map(|v| format!("${:.2}", v))
            .unwrap_or_else(|| "n/a".to_string()),
        summary
            .avg_rating
            .map(|v| format!("{:.2}", v))
            .unwrap_or_else(|| "n/a".to_string()),
        summary
            .avg_reviews
            .map(|v| format!("{:.0}", v))
            .unwrap_or_else(|| "n/a".to_string()),
    );
    if let Some(ref best) = report.dashboard.best_author {
        println!(
            "   🏅 Best author: {} ({:.2})",
            best.author, best.mean_rating
        );
    }
    if let Some(ref path) = export_path {
        println!("   💾 Filtered data exported to: {}", path.display());
    }
    println!(
        "   Duration: {:.2}s",
        start_time.elapsed().as_secs_f64()
    );
    println!(
        "\n✅ Dashboard complete! Report saved to: {}",
        output_path.display()
    );

    Ok(())
}

/// Handle --list-filters: print every filter value and the default selection.
fn print_filter_options(dashboard: &Dashboard<'_>) {
    let options = dashboard.options();
    let defaults = dashboard.default_filters();

    println!("\n🔍 Available filters:\n");
    println!(
        "   Years: {}",
        options
            .years
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!("   Genres: {}", describe_list(&options.genres));
    println!(
        "   Price categories: {}",
        describe_list(&options.price_categories)
    );

    println!("\n   Default selection:");
    println!("     Year: {}", describe_year(defaults.year));
    println!("     Genres: {}", describe_list(&defaults.genres));
    println!(
        "     Price categories: {}",
        describe_list(&defaults.price_categories)
    );
}

fn describe_year(year: Option<i32>) -> String {
    year.map(|y| y.to_string())
        .unwrap_or_else(|| "(none)".to_string())
}

fn describe_list<T: std::fmt::Display>(values: &[T]) -> String {
    if values.is_empty() {
        "(none)".to_string()
    } else {
        values
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Where the configuration came from, logged once the subscriber is up.
enum ConfigSource {
    Explicit(PathBuf),
    DefaultFile,
    Defaults,
    Invalid(anyhow::Error),
}

impl ConfigSource {
    fn log(&self) {
        match self {
            ConfigSource::Explicit(path) => info!("Loaded config from: {}", path.display()),
            ConfigSource::DefaultFile => {
                info!("Loaded default config from {}", DEFAULT_CONFIG_FILE)
            }
            ConfigSource::Defaults => debug!("No config file found, using defaults"),
            ConfigSource::Invalid(e) => warn!("Failed to load config: {:#}", e),
        }
    }
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<(Config, ConfigSource)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        let config = Config::load(config_path)?;
        return Ok((config, ConfigSource::Explicit(config_path.clone())));
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => Ok((config, ConfigSource::DefaultFile)),
        Ok(None) => Ok((Config::default(), ConfigSource::Defaults)),
        Err(e) => Ok((Config::default(), ConfigSource::Invalid(e))),
    }
}
