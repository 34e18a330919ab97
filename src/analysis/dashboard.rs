//! Request/response rendering of the dashboard.
//!
//! A [`Dashboard`] borrows the loaded dataset and turns a [`FilterState`]
//! into a [`DashboardModel`]. Nothing is cached between calls: every render
//! recomputes all aggregates from scratch.

use super::aggregator::{
    author_leaderboard, best_author, correlation_matrix, popularity_by_genre, popularity_by_price,
    price_category_distribution, rating_by_genre, rating_category_by_genre, rating_trend,
    recurring_top_books, summary_metrics, top_authors,
};
use super::commentary::{build_commentary, hypotheses};
use crate::dataset::{Dataset, FilterOptions, FilterState, FilteredView};
use crate::models::DashboardModel;
use std::time::Instant;
use tracing::debug;

/// Tunables for the aggregates and the commentary.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisSettings {
    /// Number of authors in the "most frequent authors" ranking.
    pub top_authors_limit: usize,
    /// Minimum years in the ranking for a recurring bestseller.
    pub recurring_min_years: u32,
    /// Minimum appearances for the author leaderboard.
    pub leaderboard_min_appearances: usize,
    /// Attach business commentary and hypotheses to the model.
    pub include_commentary: bool,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            top_authors_limit: 10,
            recurring_min_years: 5,
            leaderboard_min_appearances: 3,
            include_commentary: true,
        }
    }
}

impl From<&crate::config::Config> for AnalysisSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            top_authors_limit: config.analysis.top_authors_limit,
            recurring_min_years: config.analysis.recurring_min_years,
            leaderboard_min_appearances: config.analysis.leaderboard_min_appearances,
            include_commentary: config.report.include_commentary,
        }
    }
}

/// The filter-aggregate pipeline over one loaded dataset.
pub struct Dashboard<'a> {
    dataset: &'a Dataset,
    options: FilterOptions,
    settings: AnalysisSettings,
}

impl<'a> Dashboard<'a> {
    /// Create a dashboard over an already loaded dataset.
    pub fn new(dataset: &'a Dataset, settings: AnalysisSettings) -> Self {
        let options = FilterOptions::from_dataset(dataset);
        debug!(
            "Filter options: {} years, {} genres, {} price categories",
            options.years.len(),
            options.genres.len(),
            options.price_categories.len()
        );

        Self {
            dataset,
            options,
            settings,
        }
    }

    /// Values offered by each filter control.
    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    /// The selection shown before the user touches any control.
    pub fn default_filters(&self) -> FilterState {
        FilterState::defaults(&self.options)
    }

    /// Rows selected by `filters`.
    pub fn filtered(&self, filters: &FilterState) -> FilteredView<'a> {
        FilteredView::apply(self.dataset, filters)
    }

    /// Compute every aggregate for one filter state.
    ///
    /// Summary metrics, the price distribution and the genre ratings use the
    /// filtered subset; all other aggregates use the full dataset.
    pub fn render(&self, filters: &FilterState) -> DashboardModel {
        let start = Instant::now();
        let view = self.filtered(filters);
        let all = self.dataset.records();

        let author_leaderboard =
            author_leaderboard(all, self.settings.leaderboard_min_appearances);
        let best_author = best_author(&author_leaderboard).cloned();

        let mut model = DashboardModel {
            filters: filters.clone(),
            summary: summary_metrics(view.records()),
            price_distribution: price_category_distribution(view.records()),
            rating_by_genre: rating_by_genre(view.records()),
            top_authors: top_authors(all, self.settings.top_authors_limit),
            recurring_books: recurring_top_books(all, self.settings.recurring_min_years),
            rating_trend: rating_trend(all),
            correlations: correlation_matrix(all),
            author_leaderboard,
            best_author,
            popularity_by_genre: popularity_by_genre(all),
            popularity_by_price: popularity_by_price(all),
            rating_category_by_genre: rating_category_by_genre(all),
            commentary: Vec::new(),
            hypotheses: Vec::new(),
        };

        if self.settings.include_commentary {
            model.commentary = build_commentary(&model);
            model.hypotheses = hypotheses();
        }

        debug!(
            "Rendered dashboard for {} of {} records in {:?}",
            model.summary.book_count,
            self.dataset.len(),
            start.elapsed()
        );

        model
    }
}
