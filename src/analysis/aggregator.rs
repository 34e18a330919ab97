//! Aggregates over book records.
//!
//! Every function here is a pure reduction of a record iterator. Callers pass
//! either the filtered view or the full dataset. Groupings keep the order in
//! which keys first appear, and all sorts are stable, so ties always resolve
//! to input order.

use super::stats::{mean, pearson, Mean};
use crate::models::{
    AuthorCount, AuthorStats, BookRecord, CategoryCount, CorrelationMatrix, CrossCount, Genre,
    GenreRating, RecurringBook, SummaryMetrics, YearRating,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::Hash;

/// Variables included in the correlation matrix, labelled as in the CSV.
pub const CORRELATION_VARIABLES: [&str; 5] = [
    "Price",
    "Reviews",
    "User Rating",
    "Años en Top",
    "Rating x Review",
];

/// Group records by key, keeping keys in first-appearance order.
fn group_in_order<'a, K, I, F>(records: I, key: F) -> Vec<(K, Vec<&'a BookRecord>)>
where
    K: Eq + Hash + Clone,
    I: IntoIterator<Item = &'a BookRecord>,
    F: Fn(&'a BookRecord) -> K,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut groups: Vec<(K, Vec<&'a BookRecord>)> = Vec::new();

    for record in records {
        let k = key(record);
        match index.get(&k) {
            Some(&i) => groups[i].1.push(record),
            None => {
                index.insert(k.clone(), groups.len());
                groups.push((k, vec![record]));
            }
        }
    }

    groups
}

/// Count records per (group, level) pair, ordered by key.
fn cross_count<'a, I, G, L>(records: I, group: G, level: L) -> Vec<CrossCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
    G: Fn(&BookRecord) -> String,
    L: Fn(&BookRecord) -> String,
{
    let mut counts: BTreeMap<(String, String), usize> = BTreeMap::new();

    for record in records {
        *counts.entry((group(record), level(record))).or_default() += 1;
    }

    counts
        .into_iter()
        .map(|((group, level), count)| CrossCount {
            group,
            level,
            count,
        })
        .collect()
}

/// Book count and mean price, rating and reviews.
pub fn summary_metrics<'a, I>(records: I) -> SummaryMetrics
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut price = Mean::default();
    let mut rating = Mean::default();
    let mut reviews = Mean::default();

    for record in records {
        price.push(record.price);
        rating.push(record.user_rating);
        reviews.push(record.reviews as f64);
    }

    SummaryMetrics {
        book_count: rating.count(),
        avg_price: price.value(),
        avg_rating: rating.value(),
        avg_reviews: reviews.value(),
    }
}

/// Books per price category, in first-appearance order.
pub fn price_category_distribution<'a, I>(records: I) -> Vec<CategoryCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let groups = group_in_order(records, |r| r.price_category.as_str());
    let total: usize = groups.iter().map(|(_, rows)| rows.len()).sum();

    groups
        .into_iter()
        .map(|(category, rows)| CategoryCount {
            category: category.to_string(),
            count: rows.len(),
            share: rows.len() as f64 / total as f64,
        })
        .collect()
}

/// Count and mean/min/max rating per genre, highest mean first.
pub fn rating_by_genre<'a, I>(records: I) -> Vec<GenreRating>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut summary: Vec<GenreRating> = group_in_order(records, |r| r.genre)
        .into_iter()
        .map(|(genre, rows)| {
            let ratings: Vec<f64> = rows.iter().map(|r| r.user_rating).collect();
            GenreRating {
                genre,
                count: ratings.len(),
                mean_rating: mean(ratings.iter().copied()).unwrap_or_default(),
                min_rating: ratings.iter().copied().fold(f64::INFINITY, f64::min),
                max_rating: ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            }
        })
        .collect();

    summary.sort_by(|a, b| b.mean_rating.total_cmp(&a.mean_rating));
    summary
}

/// The `limit` authors with the most bestseller entries.
pub fn top_authors<'a, I>(records: I, limit: usize) -> Vec<AuthorCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut authors: Vec<AuthorCount> = group_in_order(records, |r| r.author.as_str())
        .into_iter()
        .map(|(author, rows)| AuthorCount {
            author: author.to_string(),
            appearances: rows.len(),
        })
        .collect();

    authors.sort_by_key(|a| std::cmp::Reverse(a.appearances));
    authors.truncate(limit);
    authors
}

/// Titles (grouped by base title and author) that spent at least
/// `min_years` years in the ranking, longest first.
pub fn recurring_top_books<'a, I>(records: I, min_years: u32) -> Vec<RecurringBook>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut books: Vec<RecurringBook> =
        group_in_order(records, |r| (r.base_title(), r.author.as_str()))
            .into_iter()
            .map(|((title, author), rows)| RecurringBook {
                base_title: title.to_string(),
                author: author.to_string(),
                years_in_top: rows.iter().map(|r| r.years_in_top).max().unwrap_or(0),
            })
            .filter(|book| book.years_in_top >= min_years)
            .collect();

    books.sort_by_key(|b| std::cmp::Reverse(b.years_in_top));
    books
}

/// Mean rating per year, oldest first.
pub fn rating_trend<'a, I>(records: I) -> Vec<YearRating>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut by_year: BTreeMap<i32, Mean> = BTreeMap::new();

    for record in records {
        by_year.entry(record.year).or_default().push(record.user_rating);
    }

    by_year
        .into_iter()
        .filter_map(|(year, m)| {
            m.value().map(|mean_rating| YearRating { year, mean_rating })
        })
        .collect()
}

/// Pearson correlations between price, reviews, rating, years in top and
/// the rating x review score.
pub fn correlation_matrix<'a, I>(records: I) -> CorrelationMatrix
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut columns: [Vec<f64>; 5] = Default::default();

    for record in records {
        columns[0].push(record.price);
        columns[1].push(record.reviews as f64);
        columns[2].push(record.user_rating);
        columns[3].push(f64::from(record.years_in_top));
        columns[4].push(record.rating_x_review);
    }

    let n = columns.len();
    let mut values = vec![vec![None; n]; n];

    for i in 0..n {
        // A defined self-correlation is exactly 1.
        values[i][i] = pearson(&columns[i], &columns[i]).map(|_| 1.0);
        for j in (i + 1)..n {
            let r = pearson(&columns[i], &columns[j]);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    CorrelationMatrix {
        variables: CORRELATION_VARIABLES.iter().map(|v| v.to_string()).collect(),
        values,
    }
}

/// Per-author statistics for authors with at least `min_appearances`
/// entries, highest mean rating first.
pub fn author_leaderboard<'a, I>(records: I, min_appearances: usize) -> Vec<AuthorStats>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    let mut authors: Vec<AuthorStats> = group_in_order(records, |r| r.author.as_str())
        .into_iter()
        .filter(|(_, rows)| rows.len() >= min_appearances)
        .map(|(author, rows)| {
            let genres: BTreeSet<Genre> = rows.iter().map(|r| r.genre).collect();
            AuthorStats {
                author: author.to_string(),
                appearances: rows.len(),
                mean_rating: mean(rows.iter().map(|r| r.user_rating)).unwrap_or_default(),
                mean_reviews: mean(rows.iter().map(|r| r.reviews as f64)).unwrap_or_default(),
                mean_price: mean(rows.iter().map(|r| r.price)).unwrap_or_default(),
                genres: genres.into_iter().collect(),
            }
        })
        .collect();

    authors.sort_by(|a, b| b.mean_rating.total_cmp(&a.mean_rating));
    authors
}

/// The leaderboard entry with the highest mean rating. Ties go to the
/// author who appears first in the data.
pub fn best_author(leaderboard: &[AuthorStats]) -> Option<&AuthorStats> {
    leaderboard.first()
}

/// Books per (genre, popularity level).
pub fn popularity_by_genre<'a, I>(records: I) -> Vec<CrossCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    cross_count(records, |r| r.genre.to_string(), |r| r.popularity.clone())
}

/// Books per (price category, popularity level).
pub fn popularity_by_price<'a, I>(records: I) -> Vec<CrossCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    cross_count(records, |r| r.price_category.clone(), |r| r.popularity.clone())
}

/// Books per (genre, rating category).
pub fn rating_category_by_genre<'a, I>(records: I) -> Vec<CrossCount>
where
    I: IntoIterator<Item = &'a BookRecord>,
{
    cross_count(records, |r| r.genre.to_string(), |r| r.rating_category.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{Dataset, FilterOptions, FilterState, FilteredView};

    const SAMPLE: &str = include_str!("../../fixtures/bestsellers_sample.csv");

    fn sample() -> Dataset {
        Dataset::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    fn create_test_record(author: &str, genre: Genre, rating: f64) -> BookRecord {
        BookRecord {
            name: format!("A book by {author}"),
            author: author.to_string(),
            genre,
            year: 2015,
            user_rating: rating,
            reviews: 1000,
            price: 10.0,
            price_category: "Intermedio".to_string(),
            popularity: "Media".to_string(),
            rating_category: "Bueno".to_string(),
            years_in_top: 1,
            rating_x_review: rating * 1000.0,
        }
    }

    fn all_filter_states(dataset: &Dataset) -> Vec<FilterState> {
        let options = FilterOptions::from_dataset(dataset);
        let mut states = Vec::new();
        for &year in &options.years {
            for genres in [vec![], vec![Genre::Fiction], options.genres.clone()] {
                for prices in [
                    vec![],
                    vec!["Barato".to_string()],
                    vec!["Barato".to_string(), "Intermedio".to_string()],
                    options.price_categories.clone(),
                ] {
                    states.push(FilterState {
                        year: Some(year),
                        genres: genres.clone(),
                        price_categories: prices,
                    });
                }
            }
        }
        states
    }

    #[test]
    fn test_summary_metrics() {
        let records = vec![
            create_test_record("A", Genre::Fiction, 4.0),
            create_test_record("B", Genre::Fiction, 5.0),
        ];
        let summary = summary_metrics(&records);

        assert_eq!(summary.book_count, 2);
        assert_eq!(summary.avg_rating, Some(4.5));
        assert_eq!(summary.avg_price, Some(10.0));
        assert_eq!(summary.avg_reviews, Some(1000.0));
    }

    #[test]
    fn test_summary_metrics_empty_subset() {
        let summary = summary_metrics(&Vec::<BookRecord>::new());
        assert_eq!(summary.book_count, 0);
        assert_eq!(summary.avg_price, None);
        assert_eq!(summary.avg_rating, None);
        assert_eq!(summary.avg_reviews, None);
    }

    #[test]
    fn test_distribution_counts_sum_to_subset_size() {
        let dataset = sample();
        for state in all_filter_states(&dataset) {
            let view = FilteredView::apply(&dataset, &state);
            let distribution = price_category_distribution(view.records());
            let total: usize = distribution.iter().map(|c| c.count).sum();
            assert_eq!(total, view.len(), "filters: {state:?}");
        }
    }

    #[test]
    fn test_average_rating_within_bounds() {
        let dataset = sample();
        for state in all_filter_states(&dataset) {
            let view = FilteredView::apply(&dataset, &state);
            let summary = summary_metrics(view.records());
            let ratings: Vec<f64> = view.records().map(|r| r.user_rating).collect();

            match summary.avg_rating {
                None => assert!(ratings.is_empty()),
                Some(avg) => {
                    let min = ratings.iter().copied().fold(f64::INFINITY, f64::min);
                    let max = ratings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                    assert!(avg >= min - 1e-9 && avg <= max + 1e-9);
                }
            }
        }
    }

    #[test]
    fn test_price_distribution_insertion_order() {
        let dataset = sample();
        let distribution = price_category_distribution(dataset.records());

        let categories: Vec<&str> = distribution.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(categories, vec!["Intermedio", "Barato", "Caro"]);

        let shares: f64 = distribution.iter().map(|c| c.share).sum();
        assert!((shares - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_rating_by_genre_sorted_by_mean() {
        let records = vec![
            create_test_record("A", Genre::NonFiction, 4.0),
            create_test_record("B", Genre::Fiction, 5.0),
            create_test_record("C", Genre::Fiction, 4.5),
        ];
        let summary = rating_by_genre(&records);

        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].genre, Genre::Fiction);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].mean_rating, 4.75);
        assert_eq!(summary[0].min_rating, 4.5);
        assert_eq!(summary[0].max_rating, 5.0);
        assert_eq!(summary[1].genre, Genre::NonFiction);
    }

    #[test]
    fn test_top_authors() {
        let dataset = sample();
        let top = top_authors(dataset.records(), 10);

        assert_eq!(top.len(), 10);
        assert_eq!(top[0].author, "Dr. Seuss");
        assert_eq!(top[0].appearances, 4);
        // Tied at 3: Suzanne Collins appears before Dav Pilkey.
        assert_eq!(top[1].author, "Suzanne Collins");
        assert_eq!(top[2].author, "Dav Pilkey");
        assert_eq!(top[3].author, "Michelle Obama");
        assert!(top.windows(2).all(|w| w[0].appearances >= w[1].appearances));
    }

    #[test]
    fn test_top_authors_limit() {
        let dataset = sample();
        assert_eq!(top_authors(dataset.records(), 3).len(), 3);
        assert!(top_authors(std::iter::empty(), 10).is_empty());
    }

    #[test]
    fn test_recurring_top_books() {
        let dataset = sample();
        let books = recurring_top_books(dataset.records(), 5);

        let titles: Vec<&str> = books.iter().map(|b| b.base_title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "Publication Manual of the American Psychological Association",
                "StrengthsFinder 2.0",
                "Oh, the Places You'll Go!",
                "The Very Hungry Caterpillar",
                "The 7 Habits of Highly Effective People",
                "Jesus Calling",
            ]
        );
        assert!(books.iter().all(|b| b.years_in_top >= 5));
        assert!(books.windows(2).all(|w| w[0].years_in_top >= w[1].years_in_top));

        // Both editions of the Covey title collapse into one entry.
        let covey: Vec<_> = books.iter().filter(|b| b.author == "Stephen R. Covey").collect();
        assert_eq!(covey.len(), 1);
        assert_eq!(covey[0].years_in_top, 7);
    }

    #[test]
    fn test_rating_trend_ascending_years() {
        let dataset = sample();
        let trend = rating_trend(dataset.records());

        let years: Vec<i32> = trend.iter().map(|y| y.year).collect();
        assert_eq!(years, vec![2009, 2010, 2011, 2012, 2013, 2014, 2015, 2016, 2018, 2019]);
        assert_eq!(trend[0].mean_rating, 4.0);
    }

    #[test]
    fn test_correlation_matrix_symmetric_with_unit_diagonal() {
        let dataset = sample();
        let matrix = correlation_matrix(dataset.records());

        assert_eq!(matrix.variables.len(), 5);
        for i in 0..5 {
            assert_eq!(matrix.get(i, i), Some(1.0));
            for j in 0..5 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
                if let Some(r) = matrix.get(i, j) {
                    assert!((-1.0..=1.0).contains(&r));
                }
            }
        }
    }

    #[test]
    fn test_correlation_matrix_degenerate_input() {
        let records = vec![create_test_record("A", Genre::Fiction, 4.0)];
        let matrix = correlation_matrix(&records);
        assert!(matrix.values.iter().flatten().all(Option::is_none));
    }

    #[test]
    fn test_author_leaderboard() {
        let dataset = sample();
        let leaderboard = author_leaderboard(dataset.records(), 3);

        let authors: Vec<&str> = leaderboard.iter().map(|a| a.author.as_str()).collect();
        assert_eq!(authors, vec!["Dr. Seuss", "Dav Pilkey", "Suzanne Collins"]);
        assert!(leaderboard.iter().all(|a| a.appearances >= 3));

        let seuss = &leaderboard[0];
        assert_eq!(seuss.appearances, 4);
        assert_eq!(seuss.genres, vec![Genre::Fiction]);
        assert_eq!(seuss.mean_price, 7.0);
    }

    #[test]
    fn test_author_leaderboard_genre_union() {
        let records = vec![
            create_test_record("Mixed", Genre::NonFiction, 4.0),
            create_test_record("Mixed", Genre::Fiction, 4.0),
            create_test_record("Mixed", Genre::NonFiction, 4.0),
        ];
        let leaderboard = author_leaderboard(&records, 3);
        assert_eq!(leaderboard[0].genres, vec![Genre::Fiction, Genre::NonFiction]);
        assert_eq!(leaderboard[0].genres_label(), "Fiction, Non Fiction");
    }

    #[test]
    fn test_best_author_tie_goes_to_first_in_input() {
        let records = vec![
            create_test_record("Zed", Genre::Fiction, 4.5),
            create_test_record("Amy", Genre::Fiction, 4.5),
            create_test_record("Zed", Genre::Fiction, 4.5),
            create_test_record("Amy", Genre::Fiction, 4.5),
            create_test_record("Low", Genre::Fiction, 4.0),
            create_test_record("Low", Genre::Fiction, 4.0),
        ];
        let leaderboard = author_leaderboard(&records, 2);

        assert_eq!(leaderboard.len(), 3);
        assert_eq!(best_author(&leaderboard).map(|a| a.author.as_str()), Some("Zed"));
        assert_eq!(best_author(&[]), None);
    }

    #[test]
    fn test_popularity_by_genre() {
        let dataset = sample();
        let counts = popularity_by_genre(dataset.records());

        let total: usize = counts.iter().map(|c| c.count).sum();
        assert_eq!(total, dataset.len());
        assert_eq!(counts[0].group, "Fiction");
        assert_eq!(counts[0].level, "Alta");
        assert_eq!(counts[0].count, 6);
        assert!(counts
            .windows(2)
            .all(|w| (&w[0].group, &w[0].level) < (&w[1].group, &w[1].level)));
    }

    #[test]
    fn test_popularity_by_price_and_rating_by_genre() {
        let dataset = sample();

        let by_price = popularity_by_price(dataset.records());
        assert_eq!(by_price.iter().map(|c| c.count).sum::<usize>(), dataset.len());
        assert!(by_price
            .iter()
            .any(|c| c.group == "Caro" && c.level == "Media" && c.count == 3));

        let by_rating = rating_category_by_genre(dataset.records());
        assert_eq!(by_rating.iter().map(|c| c.count).sum::<usize>(), dataset.len());
        assert!(by_rating
            .iter()
            .any(|c| c.group == "Non Fiction" && c.level == "Bueno" && c.count == 5));
    }
}
