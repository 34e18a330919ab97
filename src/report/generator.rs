//! Markdown and JSON report generation.
//!
//! The Markdown report mirrors the dashboard layout: key metrics first, then
//! one section per chart with its table and commentary.

use crate::analysis::commentary;
use crate::models::{
    CorrelationMatrix, CrossCount, DashboardModel, Report, ReportMetadata, SummaryMetrics,
};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report) -> String {
    let model = &report.dashboard;
    let mut output = String::new();

    // Title
    output.push_str("# Amazon Bestsellers Dashboard\n\n");

    output.push_str(&generate_metadata_section(&report.metadata, model));
    output.push_str(&generate_metrics_section(&model.summary));

    output.push_str(&generate_price_section(model));
    output.push_str(&generate_genre_section(model));
    output.push_str(&generate_top_authors_section(model));
    output.push_str(&generate_recurring_section(model));
    output.push_str(&generate_trend_section(model));
    output.push_str(&generate_correlation_section(model));
    output.push_str(&generate_leaderboard_section(model));
    output.push_str(&generate_cross_section(
        model,
        commentary::POPULARITY_BY_GENRE,
        ("Genre", "Popularity"),
        &model.popularity_by_genre,
    ));
    output.push_str(&generate_cross_section(
        model,
        commentary::POPULARITY_BY_PRICE,
        ("Price Category", "Popularity"),
        &model.popularity_by_price,
    ));
    output.push_str(&generate_cross_section(
        model,
        commentary::RATING_CATEGORY_BY_GENRE,
        ("Genre", "Rating Category"),
        &model.rating_category_by_genre,
    ));

    output.push_str(&generate_hypotheses_section(&model.hypotheses));
    output.push_str(&generate_footer());

    output
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Format an optional number, or "n/a" when it is undefined.
fn format_optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".to_string(),
    }
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata, model: &DashboardModel) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Dataset:** `{}`\n", metadata.dataset_path));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Records:** {} of {} after filtering\n",
        metadata.filtered_records, metadata.total_records
    ));

    let year = model
        .filters
        .year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "none".to_string());
    let genres = model
        .filters
        .genres
        .iter()
        .map(|g| g.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    section.push_str(&format!("- **Year:** {}\n", year));
    section.push_str(&format!("- **Genres:** {}\n", or_none(&genres)));
    section.push_str(&format!(
        "- **Price Categories:** {}\n",
        or_none(&model.filters.price_categories.join(", "))
    ));
    section.push('\n');

    section
}

fn or_none(list: &str) -> &str {
    if list.is_empty() {
        "(none)"
    } else {
        list
    }
}

/// Generate the key metrics table.
fn generate_metrics_section(summary: &SummaryMetrics) -> String {
    let mut section = String::new();

    section.push_str("## Key Metrics\n\n");
    section.push_str("| 📚 Books in the Top | 💲 Average Price | ⭐ Average Rating | 🗣️ Average Reviews |\n");
    section.push_str("|:---:|:---:|:---:|:---:|\n");

    let price = match summary.avg_price {
        Some(p) => format!("${:.2}", p),
        None => "n/a".to_string(),
    };

    section.push_str(&format!(
        "| {} | {} | {} | {} |\n\n",
        summary.book_count,
        price,
        format_optional(summary.avg_rating, 2),
        format_optional(summary.avg_reviews, 0)
    ));

    section
}

/// Section heading plus the chart hint, if commentary is attached.
fn section_header(model: &DashboardModel, title: &str) -> String {
    match model.commentary_for(title) {
        Some(c) => format!("## {}\n\n*Chart: {}*\n\n", title, c.chart),
        None => format!("## {}\n\n", title),
    }
}

/// Interpretation and recommendation for a section, if any.
fn commentary_block(model: &DashboardModel, title: &str) -> String {
    match model.commentary_for(title) {
        Some(c) => format!(
            "📌 **Interpretation:** {}\n\n🎯 **Recommendation:** {}\n\n",
            c.interpretation, c.recommendation
        ),
        None => String::new(),
    }
}

fn generate_price_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::PRICE_DISTRIBUTION);

    if model.price_distribution.is_empty() {
        section.push_str("*No books match the current filters.*\n\n");
    } else {
        section.push_str("| Category | Books | Share |\n");
        section.push_str("|:---|:---:|:---:|\n");
        for c in &model.price_distribution {
            section.push_str(&format!(
                "| {} | {} | {:.1}% |\n",
                c.category,
                c.count,
                c.share * 100.0
            ));
        }
        section.push('\n');
    }

    section.push_str(&commentary_block(model, commentary::PRICE_DISTRIBUTION));
    section
}

fn generate_genre_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::RATING_BY_GENRE);

    if model.rating_by_genre.is_empty() {
        section.push_str("*No books match the current filters.*\n\n");
    } else {
        section.push_str("| Genre | Books | Mean Rating | Min Rating | Max Rating |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|\n");
        for g in &model.rating_by_genre {
            section.push_str(&format!(
                "| {} | {} | {:.2} | {:.1} | {:.1} |\n",
                g.genre, g.count, g.mean_rating, g.min_rating, g.max_rating
            ));
        }
        section.push('\n');
    }

    section.push_str(&commentary_block(model, commentary::RATING_BY_GENRE));
    section
}

fn generate_top_authors_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::TOP_AUTHORS);

    section.push_str("| # | Author | Appearances |\n");
    section.push_str("|:---:|:---|:---:|\n");
    for (i, a) in model.top_authors.iter().enumerate() {
        section.push_str(&format!("| {} | {} | {} |\n", i + 1, a.author, a.appearances));
    }
    section.push('\n');

    section.push_str(&commentary_block(model, commentary::TOP_AUTHORS));
    section
}

fn generate_recurring_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::RECURRING_BOOKS);

    if model.recurring_books.is_empty() {
        section.push_str("*No recurring bestsellers.*\n\n");
    } else {
        section.push_str("| Book | Author | Years in Top |\n");
        section.push_str("|:---|:---|:---:|\n");
        for b in &model.recurring_books {
            section.push_str(&format!(
                "| {} | {} | {} |\n",
                b.base_title, b.author, b.years_in_top
            ));
        }
        section.push('\n');
    }

    section.push_str(&commentary_block(model, commentary::RECURRING_BOOKS));
    section
}

fn generate_trend_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::RATING_TREND);

    section.push_str("| Year | Mean Rating |\n");
    section.push_str("|:---:|:---:|\n");
    for y in &model.rating_trend {
        section.push_str(&format!("| {} | {:.3} |\n", y.year, y.mean_rating));
    }
    section.push('\n');

    section.push_str(&commentary_block(model, commentary::RATING_TREND));
    section
}

/// Render a correlation matrix as a Markdown table.
fn correlation_table(matrix: &CorrelationMatrix) -> String {
    let mut table = String::new();

    table.push_str("| |");
    for v in &matrix.variables {
        table.push_str(&format!(" {} |", v));
    }
    table.push('\n');

    table.push_str("|:---|");
    table.push_str(&":---:|".repeat(matrix.variables.len()));
    table.push('\n');

    for (i, v) in matrix.variables.iter().enumerate() {
        table.push_str(&format!("| **{}** |", v));
        for j in 0..matrix.variables.len() {
            table.push_str(&format!(" {} |", format_optional(matrix.get(i, j), 2)));
        }
        table.push('\n');
    }
    table.push('\n');

    table
}

fn generate_correlation_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::CORRELATIONS);
    section.push_str(&correlation_table(&model.correlations));
    section.push_str(&commentary_block(model, commentary::CORRELATIONS));
    section
}

fn generate_leaderboard_section(model: &DashboardModel) -> String {
    let mut section = section_header(model, commentary::FEATURED_AUTHORS);

    if let Some(best) = &model.best_author {
        section.push_str(&format!(
            "🏅 **Best mean rating:** {} ({:.2})\n\n",
            best.author, best.mean_rating
        ));
    }

    if model.author_leaderboard.is_empty() {
        section.push_str("*No author appears often enough.*\n\n");
    } else {
        section.push_str("| Author | Appearances | Mean Rating | Mean Reviews | Mean Price | Genres |\n");
        section.push_str("|:---|:---:|:---:|:---:|:---:|:---|\n");
        for a in &model.author_leaderboard {
            section.push_str(&format!(
                "| {} | {} | {:.2} | {:.0} | ${:.2} | {} |\n",
                a.author,
                a.appearances,
                a.mean_rating,
                a.mean_reviews,
                a.mean_price,
                a.genres_label()
            ));
        }
        section.push('\n');
    }

    section.push_str(&commentary_block(model, commentary::FEATURED_AUTHORS));
    section
}

fn generate_cross_section(
    model: &DashboardModel,
    title: &str,
    (group_label, level_label): (&str, &str),
    counts: &[CrossCount],
) -> String {
    let mut section = section_header(model, title);

    section.push_str(&format!("| {} | {} | Books |\n", group_label, level_label));
    section.push_str("|:---|:---|:---:|\n");
    for c in counts {
        section.push_str(&format!("| {} | {} | {} |\n", c.group, c.level, c.count));
    }
    section.push('\n');

    section.push_str(&commentary_block(model, title));
    section
}

fn generate_hypotheses_section(hypotheses: &[String]) -> String {
    if hypotheses.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Hypotheses Evaluated\n\n");
    for (i, h) in hypotheses.iter().enumerate() {
        section.push_str(&format!("{}. *{}*\n", i + 1, h));
    }
    section.push_str("\nEach of these is examined by one or more of the sections above.\n\n");

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str(&format!(
        "*Report generated by bestsellers v{}*\n",
        env!("CARGO_PKG_VERSION")
    ));

    footer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisSettings, Dashboard};
    use crate::dataset::{Dataset, FilterState};
    use chrono::Utc;

    const SAMPLE: &str = include_str!("../../fixtures/bestsellers_sample.csv");

    fn create_test_report(filters: Option<FilterState>, settings: AnalysisSettings) -> Report {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let dashboard = Dashboard::new(&dataset, settings);
        let filters = filters.unwrap_or_else(|| dashboard.default_filters());
        let model = dashboard.render(&filters);

        Report {
            metadata: ReportMetadata {
                dataset_path: "fixtures/bestsellers_sample.csv".to_string(),
                generated_at: Utc::now(),
                total_records: dataset.len(),
                filtered_records: model.summary.book_count,
            },
            dashboard: model,
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let report = create_test_report(None, AnalysisSettings::default());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("# Amazon Bestsellers Dashboard"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("## Key Metrics"));
        assert!(markdown.contains("## Price Category Distribution"));
        assert!(markdown.contains("## Correlations Between Key Variables"));
        assert!(markdown.contains("## Hypotheses Evaluated"));
        assert!(markdown.contains("**Records:** 1 of 31 after filtering"));
        assert!(markdown.contains("$17.00"));
        assert!(markdown.contains("🏅 **Best mean rating:** Dr. Seuss"));
        assert!(markdown.contains("*Chart: donut*"));
    }

    #[test]
    fn test_markdown_without_commentary() {
        let settings = AnalysisSettings {
            include_commentary: false,
            ..AnalysisSettings::default()
        };
        let report = create_test_report(None, settings);
        let markdown = generate_markdown_report(&report);

        assert!(!markdown.contains("📌 **Interpretation:**"));
        assert!(!markdown.contains("## Hypotheses Evaluated"));
        assert!(markdown.contains("## Rating Trend by Year"));
    }

    #[test]
    fn test_markdown_empty_selection() {
        let filters = FilterState {
            year: Some(2015),
            genres: vec![],
            price_categories: vec![],
        };
        let report = create_test_report(Some(filters), AnalysisSettings::default());
        let markdown = generate_markdown_report(&report);

        assert!(markdown.contains("| 0 | n/a | n/a | n/a |"));
        assert!(markdown.contains("- **Genres:** (none)"));
        assert!(markdown.contains("*No books match the current filters.*"));
    }

    #[test]
    fn test_correlation_table() {
        let matrix = CorrelationMatrix {
            variables: vec!["Price".to_string(), "Reviews".to_string()],
            values: vec![vec![Some(1.0), Some(-0.5)], vec![Some(-0.5), None]],
        };
        let table = correlation_table(&matrix);

        assert!(table.starts_with("| | Price | Reviews |\n|:---|:---:|:---:|\n"));
        assert!(table.contains("| **Price** | 1.00 | -0.50 |"));
        assert!(table.contains("| **Reviews** | -0.50 | n/a |"));
    }

    #[test]
    fn test_generate_json_report() {
        let report = create_test_report(None, AnalysisSettings::default());
        let json = generate_json_report(&report).unwrap();

        assert!(json.contains("\"dataset_path\""));
        assert!(json.contains("\"price_distribution\""));
        assert!(json.contains("\"correlations\""));
        assert!(json.contains("\"best_author\""));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["dashboard"]["summary"]["book_count"], 1);
    }

    #[test]
    fn test_json_empty_selection_uses_null() {
        let filters = FilterState {
            year: None,
            genres: vec![],
            price_categories: vec![],
        };
        let report = create_test_report(Some(filters), AnalysisSettings::default());
        let json = generate_json_report(&report).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["dashboard"]["summary"]["avg_rating"].is_null());
        assert_eq!(value["dashboard"]["filters"]["year"], serde_json::Value::Null);
    }
}
