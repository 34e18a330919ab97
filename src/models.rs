//! Data models for the bestsellers dashboard.
//!
//! This module contains the book record read from the source CSV and every
//! result type produced by the filter-aggregate pipeline.

use crate::dataset::FilterState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Columns that must be present in the source CSV header.
pub const REQUIRED_COLUMNS: [&str; 12] = [
    "Name",
    "Author",
    "Genre",
    "Year",
    "User Rating",
    "Reviews",
    "Price",
    "Price Category",
    "Popularidad",
    "Rating Category",
    "Años en Top",
    "Rating x Review",
];

/// Book genre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Genre {
    Fiction,
    #[serde(rename = "Non Fiction")]
    NonFiction,
}

impl Genre {
    /// The label used in the source data.
    pub fn as_str(&self) -> &'static str {
        match self {
            Genre::Fiction => "Fiction",
            Genre::NonFiction => "Non Fiction",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "fiction" => Ok(Genre::Fiction),
            "non fiction" | "nonfiction" => Ok(Genre::NonFiction),
            other => Err(format!(
                "Unknown genre '{}' (expected 'Fiction' or 'Non Fiction')",
                other
            )),
        }
    }
}

/// One row of the bestsellers table.
///
/// Price category, popularity and rating category are computed upstream and
/// carried as opaque labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "Genre")]
    pub genre: Genre,
    #[serde(rename = "Year")]
    pub year: i32,
    #[serde(rename = "User Rating")]
    pub user_rating: f64,
    #[serde(rename = "Reviews")]
    pub reviews: u64,
    #[serde(rename = "Price")]
    pub price: f64,
    #[serde(rename = "Price Category")]
    pub price_category: String,
    #[serde(rename = "Popularidad")]
    pub popularity: String,
    #[serde(rename = "Rating Category")]
    pub rating_category: String,
    #[serde(rename = "Años en Top")]
    pub years_in_top: u32,
    #[serde(rename = "Rating x Review")]
    pub rating_x_review: f64,
}

impl BookRecord {
    /// Title up to the first colon, trimmed. Titles without a colon are
    /// returned whole.
    pub fn base_title(&self) -> &str {
        match self.name.split_once(':') {
            Some((head, _)) => head.trim(),
            None => self.name.trim(),
        }
    }
}

/// Headline numbers over the filtered subset.
///
/// Means are `None` when the subset is empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub book_count: usize,
    pub avg_price: Option<f64>,
    pub avg_rating: Option<f64>,
    pub avg_reviews: Option<f64>,
}

/// Count of books in one category, with its share of the subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
    /// Fraction of the subset in `[0, 1]`.
    pub share: f64,
}

/// Rating statistics for one genre.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenreRating {
    pub genre: Genre,
    pub count: usize,
    pub mean_rating: f64,
    pub min_rating: f64,
    pub max_rating: f64,
}

/// Number of bestseller entries for an author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorCount {
    pub author: String,
    pub appearances: usize,
}

/// A title that stayed in the ranking for many years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringBook {
    pub base_title: String,
    pub author: String,
    pub years_in_top: u32,
}

/// Mean user rating for one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearRating {
    pub year: i32,
    pub mean_rating: f64,
}

/// Pairwise Pearson correlations between numeric columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub variables: Vec<String>,
    /// Row-major; `None` where a correlation is undefined (zero variance or
    /// fewer than two records).
    pub values: Vec<Vec<Option<f64>>>,
}

impl CorrelationMatrix {
    /// Correlation between variables `i` and `j`.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        self.values.get(i).and_then(|row| row.get(j)).copied().flatten()
    }

    /// The off-diagonal pair with the largest absolute correlation.
    pub fn strongest_pair(&self) -> Option<(&str, &str, f64)> {
        let n = self.variables.len();
        let mut best: Option<(usize, usize, f64)> = None;

        for i in 0..n {
            for j in (i + 1)..n {
                if let Some(r) = self.get(i, j) {
                    if best.map_or(true, |(_, _, b)| r.abs() > b.abs()) {
                        best = Some((i, j, r));
                    }
                }
            }
        }

        best.map(|(i, j, r)| (self.variables[i].as_str(), self.variables[j].as_str(), r))
    }
}

/// Per-author statistics for the leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorStats {
    pub author: String,
    pub appearances: usize,
    pub mean_rating: f64,
    pub mean_reviews: f64,
    pub mean_price: f64,
    /// Every genre the author appeared under, sorted.
    pub genres: Vec<Genre>,
}

impl AuthorStats {
    /// Genres joined for display.
    pub fn genres_label(&self) -> String {
        self.genres
            .iter()
            .map(Genre::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Count of books sharing a (group, level) pair, e.g. (genre, popularity).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossCount {
    pub group: String,
    pub level: String,
    pub count: usize,
}

/// Chart the UI is expected to draw for a section.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Donut,
    Bar,
    HorizontalBar,
    Line,
    Heatmap,
    Scatter,
    GroupedHistogram,
    GroupedBar,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChartKind::Donut => "donut",
            ChartKind::Bar => "bar",
            ChartKind::HorizontalBar => "horizontal bar",
            ChartKind::Line => "line",
            ChartKind::Heatmap => "heatmap",
            ChartKind::Scatter => "scatter",
            ChartKind::GroupedHistogram => "grouped histogram",
            ChartKind::GroupedBar => "grouped bar",
        };
        f.write_str(label)
    }
}

/// Business commentary attached to a chart section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentarySection {
    pub title: String,
    pub chart: ChartKind,
    pub interpretation: String,
    pub recommendation: String,
}

/// Everything the UI needs to draw the dashboard for one filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardModel {
    pub filters: FilterState,
    pub summary: SummaryMetrics,
    pub price_distribution: Vec<CategoryCount>,
    pub rating_by_genre: Vec<GenreRating>,
    pub top_authors: Vec<AuthorCount>,
    pub recurring_books: Vec<RecurringBook>,
    pub rating_trend: Vec<YearRating>,
    pub correlations: CorrelationMatrix,
    pub author_leaderboard: Vec<AuthorStats>,
    pub best_author: Option<AuthorStats>,
    pub popularity_by_genre: Vec<CrossCount>,
    pub popularity_by_price: Vec<CrossCount>,
    pub rating_category_by_genre: Vec<CrossCount>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub commentary: Vec<CommentarySection>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub hypotheses: Vec<String>,
}

impl DashboardModel {
    /// Commentary for the section with the given title, if any.
    pub fn commentary_for(&self, title: &str) -> Option<&CommentarySection> {
        self.commentary.iter().find(|c| c.title == title)
    }
}

/// Metadata about a generated report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Source CSV the dataset was loaded from.
    pub dataset_path: String,
    /// When the report was generated.
    pub generated_at: DateTime<Utc>,
    /// Records in the full dataset.
    pub total_records: usize,
    /// Records left after filtering.
    pub filtered_records: usize,
}

/// A rendered dashboard plus its metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub metadata: ReportMetadata,
    pub dashboard: DashboardModel,
}
