//! Year, genre and price-category filtering.
//!
//! Filtering never copies or mutates records: a [`FilteredView`] is a borrowed
//! dataset plus the indices of the rows that passed.

use super::Dataset;
use crate::models::{BookRecord, Genre};
use csv::StringRecord;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Rejected filter selections.
#[derive(Error, Debug, PartialEq)]
pub enum FilterError {
    #[error("Year {year} is not in the dataset (available: {})", join(.available))]
    UnknownYear { year: i32, available: Vec<i32> },

    #[error("Price category '{value}' is not in the dataset (available: {})", .available.join(", "))]
    UnknownPriceCategory {
        value: String,
        available: Vec<String>,
    },
}

fn join(years: &[i32]) -> String {
    years
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Distinct values offered by each filter control.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterOptions {
    /// Ascending.
    pub years: Vec<i32>,
    /// First-appearance order.
    pub genres: Vec<Genre>,
    /// First-appearance order.
    pub price_categories: Vec<String>,
}

impl FilterOptions {
    /// Collect the distinct filter values present in the dataset.
    pub fn from_dataset(dataset: &Dataset) -> Self {
        let mut options = Self::default();

        for record in dataset.records() {
            if !options.years.contains(&record.year) {
                options.years.push(record.year);
            }
            if !options.genres.contains(&record.genre) {
                options.genres.push(record.genre);
            }
            if !options.price_categories.contains(&record.price_category) {
                options.price_categories.push(record.price_category.clone());
            }
        }

        options.years.sort_unstable();
        options
    }
}

/// The active filter selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    /// Selected year; `None` only when the dataset has no rows.
    pub year: Option<i32>,
    pub genres: Vec<Genre>,
    pub price_categories: Vec<String>,
}

impl FilterState {
    /// First year, every genre, every price category.
    pub fn defaults(options: &FilterOptions) -> Self {
        Self {
            year: options.years.first().copied(),
            genres: options.genres.clone(),
            price_categories: options.price_categories.clone(),
        }
    }

    /// Build a selection from explicit choices, falling back to the defaults
    /// for anything not provided.
    ///
    /// Price categories are matched case-insensitively and stored with the
    /// dataset's spelling.
    pub fn from_selection(
        options: &FilterOptions,
        year: Option<i32>,
        genres: Option<Vec<Genre>>,
        price_categories: Option<Vec<String>>,
    ) -> Result<Self, FilterError> {
        let mut state = Self::defaults(options);

        if let Some(year) = year {
            if !options.years.contains(&year) {
                return Err(FilterError::UnknownYear {
                    year,
                    available: options.years.clone(),
                });
            }
            state.year = Some(year);
        }

        if let Some(genres) = genres {
            state.genres = dedup(genres);
        }

        if let Some(values) = price_categories {
            let mut selected = Vec::with_capacity(values.len());
            for value in values {
                let canonical = options
                    .price_categories
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(value.trim()))
                    .ok_or_else(|| FilterError::UnknownPriceCategory {
                        value: value.clone(),
                        available: options.price_categories.clone(),
                    })?;
                selected.push(canonical.clone());
            }
            state.price_categories = dedup(selected);
        }

        Ok(state)
    }

    /// Whether a record passes all three predicates.
    pub fn matches(&self, record: &BookRecord) -> bool {
        self.year == Some(record.year)
            && self.genres.contains(&record.genre)
            && self.price_categories.contains(&record.price_category)
    }
}

fn dedup<T: PartialEq>(values: Vec<T>) -> Vec<T> {
    let mut unique = Vec::with_capacity(values.len());
    for value in values {
        if !unique.contains(&value) {
            unique.push(value);
        }
    }
    unique
}

/// Rows of a dataset selected by a filter.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    indices: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// Select the rows matching `filters`.
    pub fn apply(dataset: &'a Dataset, filters: &FilterState) -> Self {
        let indices: Vec<usize> = dataset
            .records()
            .iter()
            .enumerate()
            .filter(|(_, record)| filters.matches(record))
            .map(|(i, _)| i)
            .collect();

        debug!(
            "Filter {:?} selected {} of {} records",
            filters,
            indices.len(),
            dataset.len()
        );

        Self { dataset, indices }
    }

    /// A view over every row.
    #[cfg(test)]
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            indices: (0..dataset.len()).collect(),
        }
    }

    /// The dataset this view borrows from.
    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    /// Selected records, in file order.
    pub fn records(&self) -> impl Iterator<Item = &'a BookRecord> + '_ {
        let records = self.dataset.records();
        self.indices.iter().map(move |&i| &records[i])
    }

    /// Selected rows exactly as read from the source.
    pub fn raw_rows(&self) -> impl Iterator<Item = &'a StringRecord> + '_ {
        let dataset = self.dataset;
        self.indices.iter().filter_map(move |&i| dataset.raw_row(i))
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}
