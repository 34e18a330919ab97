//! Business commentary for each dashboard section.
//!
//! The text is derived from the computed aggregates, so it stays accurate
//! for whatever selection and dataset the dashboard is rendered with.

use crate::models::{ChartKind, CommentarySection, CrossCount, DashboardModel};

pub const PRICE_DISTRIBUTION: &str = "Price Category Distribution";
pub const RATING_BY_GENRE: &str = "Ratings by Genre";
pub const TOP_AUTHORS: &str = "Most Frequent Authors";
pub const RECURRING_BOOKS: &str = "Recurring Bestsellers";
pub const RATING_TREND: &str = "Rating Trend by Year";
pub const CORRELATIONS: &str = "Correlations Between Key Variables";
pub const FEATURED_AUTHORS: &str = "Featured Authors";
pub const POPULARITY_BY_GENRE: &str = "Popularity by Genre";
pub const POPULARITY_BY_PRICE: &str = "Popularity by Price Category";
pub const RATING_CATEGORY_BY_GENRE: &str = "Rating Categories by Genre";

/// Hypotheses the dashboard was built to examine.
pub fn hypotheses() -> Vec<String> {
    vec![
        "Cheaper books are rated higher.".to_string(),
        "Books with more reviews sell more.".to_string(),
        "Some genres are consistently well rated.".to_string(),
        "Price, rating and reviews are correlated.".to_string(),
        "Some books and authors return to the ranking year after year.".to_string(),
    ]
}

/// Commentary for every section of a rendered dashboard.
pub fn build_commentary(model: &DashboardModel) -> Vec<CommentarySection> {
    vec![
        price_distribution(model),
        rating_by_genre(model),
        top_authors(model),
        recurring_books(model),
        rating_trend(model),
        correlations(model),
        featured_authors(model),
        popularity(
            POPULARITY_BY_GENRE,
            &model.popularity_by_genre,
            "genre",
            "Push the most popular level of each genre in marketing and bundles; reposition low-popularity titles with promotions or new editions.",
        ),
        popularity(
            POPULARITY_BY_PRICE,
            &model.popularity_by_price,
            "price category",
            "Favour the price band where high popularity concentrates, and review pricing of expensive titles stuck at low or medium popularity.",
        ),
        rating_categories(model),
    ]
}

fn section(
    title: &str,
    chart: ChartKind,
    interpretation: String,
    recommendation: impl Into<String>,
) -> CommentarySection {
    CommentarySection {
        title: title.to_string(),
        chart,
        interpretation,
        recommendation: recommendation.into(),
    }
}

fn percent(share: f64) -> String {
    format!("{:.0}%", share * 100.0)
}

fn price_distribution(model: &DashboardModel) -> CommentarySection {
    let mut ranked: Vec<_> = model.price_distribution.iter().collect();
    ranked.sort_by_key(|c| std::cmp::Reverse(c.count));

    let interpretation = match ranked.as_slice() {
        [] => "No books match the current filters.".to_string(),
        [only] => format!(
            "Every selected book falls in the **{}** price category.",
            only.category
        ),
        [first, rest @ ..] => {
            let others = rest
                .iter()
                .map(|c| format!("**{}** ({})", c.category, percent(c.share)))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "Most selected books are in the **{}** price category ({}), followed by {}.",
                first.category,
                percent(first.share),
                others
            )
        }
    };

    let recommendation = match ranked.first() {
        Some(top) => format!(
            "Keep the catalogue weighted towards **{}** titles to maximise volume; consider bundles or discounts to lift the share of the least represented price band.",
            top.category
        ),
        None => "Widen the filters to see the price mix.".to_string(),
    };

    section(PRICE_DISTRIBUTION, ChartKind::Donut, interpretation, recommendation)
}

fn rating_by_genre(model: &DashboardModel) -> CommentarySection {
    let interpretation = match model.rating_by_genre.as_slice() {
        [] => "No books match the current filters.".to_string(),
        [only] => format!(
            "Only **{}** is present, with a mean rating of {:.2} across {} books.",
            only.genre, only.mean_rating, only.count
        ),
        [leader, runner_up, ..] => format!(
            "**{}** leads with a mean rating of {:.2}, ahead of **{}** at {:.2}.",
            leader.genre, leader.mean_rating, runner_up.genre, runner_up.mean_rating
        ),
    };

    let recommendation = match model.rating_by_genre.first() {
        Some(leader) => format!(
            "To raise customer satisfaction, prioritise well-rated **{}** titles and study what the best of them have in common.",
            leader.genre
        ),
        None => "Widen the filters to compare genres.".to_string(),
    };

    section(RATING_BY_GENRE, ChartKind::Bar, interpretation, recommendation)
}

fn top_authors(model: &DashboardModel) -> CommentarySection {
    let interpretation = match model.top_authors.first() {
        Some(top) => format!(
            "**{}** entered the bestseller ranking most often ({} times). These authors show editorial consistency and a loyal readership.",
            top.author, top.appearances
        ),
        None => "The dataset has no authors.".to_string(),
    };

    section(
        TOP_AUTHORS,
        ChartKind::HorizontalBar,
        interpretation,
        "Explore partnerships with these authors for new releases, translations or themed campaigns, and use them as a creative benchmark.",
    )
}

fn recurring_books(model: &DashboardModel) -> CommentarySection {
    let interpretation = match model.recurring_books.first() {
        Some(top) => format!(
            "{} titles stayed in the ranking for many years, led by **{}** by {} ({} years). They reflect sustained demand and strong word of mouth.",
            model.recurring_books.len(),
            top.base_title,
            top.author,
            top.years_in_top
        ),
        None => "No title stayed in the ranking long enough to qualify.".to_string(),
    };

    section(
        RECURRING_BOOKS,
        ChartKind::HorizontalBar,
        interpretation,
        "Use these titles and authors as anchors for marketing campaigns, themed bundles and new releases in a similar style.",
    )
}

fn rating_trend(model: &DashboardModel) -> CommentarySection {
    let interpretation = match (model.rating_trend.first(), model.rating_trend.last()) {
        (Some(first), Some(last)) if first.year != last.year => {
            let delta = last.mean_rating - first.mean_rating;
            let direction = if delta > 0.005 {
                "rose"
            } else if delta < -0.005 {
                "fell"
            } else {
                "held steady"
            };
            format!(
                "The mean rating {} from {:.2} in {} to {:.2} in {}.",
                direction, first.mean_rating, first.year, last.mean_rating, last.year
            )
        }
        (Some(only), _) => format!(
            "Only {} is available, with a mean rating of {:.2}.",
            only.year, only.mean_rating
        ),
        _ => "The dataset has no ratings.".to_string(),
    };

    section(
        RATING_TREND,
        ChartKind::Line,
        interpretation,
        "Keep promoting highly rated books and look for editorial patterns among the best-rated titles of recent years.",
    )
}

fn correlations(model: &DashboardModel) -> CommentarySection {
    let interpretation = match model.correlations.strongest_pair() {
        Some((a, b, r)) => {
            let strength = match r.abs() {
                x if x >= 0.7 => "strong",
                x if x >= 0.4 => "moderate",
                _ => "weak",
            };
            let sign = if r >= 0.0 { "positive" } else { "negative" };
            format!(
                "The strongest relationship is a {} {} correlation between **{}** and **{}** (r = {:.2}).",
                strength, sign, a, b, r
            )
        }
        None => "Not enough variation in the data to compute correlations.".to_string(),
    };

    section(
        CORRELATIONS,
        ChartKind::Heatmap,
        interpretation,
        "Prioritise books with many reviews and high ratings for retention and visibility, and investigate what drives review volume.",
    )
}

fn featured_authors(model: &DashboardModel) -> CommentarySection {
    let interpretation = match &model.best_author {
        Some(best) => format!(
            "Best mean rating among frequent authors: **{}** with {:.2}, {:.0} reviews on average and {} titles in the ranking.",
            best.author, best.mean_rating, best.mean_reviews, best.appearances
        ),
        None => "No author appears often enough to be featured.".to_string(),
    };

    section(
        FEATURED_AUTHORS,
        ChartKind::Scatter,
        interpretation,
        "Consider these authors for new editions, translations, bundles or featured campaigns; they show sustained success.",
    )
}

/// Most common level within each group, in group order.
fn dominant_levels(counts: &[CrossCount]) -> Vec<(&str, &str)> {
    let mut dominant: Vec<(&str, &str, usize)> = Vec::new();

    for c in counts {
        match dominant.iter_mut().find(|(group, _, _)| *group == c.group) {
            Some(entry) if c.count > entry.2 => {
                *entry = (c.group.as_str(), c.level.as_str(), c.count);
            }
            Some(_) => {}
            None => dominant.push((c.group.as_str(), c.level.as_str(), c.count)),
        }
    }

    dominant.into_iter().map(|(g, l, _)| (g, l)).collect()
}

fn popularity(
    title: &str,
    counts: &[CrossCount],
    group_name: &str,
    recommendation: &str,
) -> CommentarySection {
    let dominant = dominant_levels(counts);

    let interpretation = if dominant.is_empty() {
        "The dataset has no popularity data.".to_string()
    } else {
        let parts = dominant
            .iter()
            .map(|(group, level)| format!("**{}** → {}", group, level))
            .collect::<Vec<_>>()
            .join("; ");
        format!("Most common popularity level per {}: {}.", group_name, parts)
    };

    section(title, ChartKind::GroupedHistogram, interpretation, recommendation)
}

fn rating_categories(model: &DashboardModel) -> CommentarySection {
    let dominant = dominant_levels(&model.rating_category_by_genre);

    let interpretation = if dominant.is_empty() {
        "The dataset has no rating categories.".to_string()
    } else {
        let parts = dominant
            .iter()
            .map(|(group, level)| format!("**{}** → {}", group, level))
            .collect::<Vec<_>>()
            .join("; ");
        format!("Most common rating category per genre: {}.", parts)
    };

    section(
        RATING_CATEGORY_BY_GENRE,
        ChartKind::GroupedBar,
        interpretation,
        "Compare rating categories across genres before committing marketing budget to a genre.",
    )
}
