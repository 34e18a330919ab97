//! CSV loading for the bestsellers dataset.
//!
//! The file is read once at startup into an immutable [`Dataset`]. The raw
//! rows and header are kept next to the parsed records so exports reproduce
//! the source columns exactly.

use crate::models::{BookRecord, REQUIRED_COLUMNS};
use csv::StringRecord;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while loading the dataset. All of them are fatal.
#[derive(Error, Debug)]
pub enum DatasetError {
    /// The file could not be opened.
    #[error("Failed to read dataset {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The header row lacks one or more required columns.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    /// A data row could not be parsed into a book record.
    #[error("Invalid row at line {line}: {source}")]
    InvalidRow {
        line: u64,
        #[source]
        source: csv::Error,
    },

    /// Malformed CSV outside of a specific record.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// The full, immutable bestsellers table.
#[derive(Debug, Clone)]
pub struct Dataset {
    headers: StringRecord,
    records: Vec<BookRecord>,
    raw_rows: Vec<StringRecord>,
}

impl Dataset {
    /// Load the dataset from a CSV file, optionally showing a spinner.
    pub fn load(path: &Path, show_progress: bool) -> Result<Self, DatasetError> {
        info!("Loading dataset: {}", path.display());

        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let spinner = if show_progress {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb.set_message(format!("Reading {}", path.display()));
            pb.enable_steady_tick(Duration::from_millis(100));
            Some(pb)
        } else {
            None
        };

        let result = Self::parse(file, spinner.as_ref());

        if let Some(pb) = spinner {
            match &result {
                Ok(dataset) => pb.finish_with_message(format!("Loaded {} records", dataset.len())),
                Err(_) => pb.abandon_with_message("Failed to load dataset"),
            }
        }

        let dataset = result?;
        info!("Loaded {} records", dataset.len());
        Ok(dataset)
    }

    /// Parse a dataset from any CSV source.
    #[cfg(test)]
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        Self::parse(reader, None)
    }

    fn parse<R: Read>(reader: R, progress: Option<&ProgressBar>) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        check_columns(&headers)?;

        let mut records = Vec::new();
        let mut raw_rows = Vec::new();

        for row in reader.records() {
            let row = row?;
            let line = row.position().map(|p| p.line()).unwrap_or_default();

            let record: BookRecord = row
                .deserialize(Some(&headers))
                .map_err(|source| DatasetError::InvalidRow { line, source })?;

            records.push(record);
            raw_rows.push(row);

            if let Some(pb) = progress {
                if records.len() % 500 == 0 {
                    pb.set_message(format!("Parsed {} records", records.len()));
                }
            }
        }

        debug!(
            "Parsed {} records with {} columns",
            records.len(),
            headers.len()
        );

        Ok(Self {
            headers,
            records,
            raw_rows,
        })
    }

    /// Header row exactly as it appeared in the source.
    pub fn headers(&self) -> &StringRecord {
        &self.headers
    }

    /// All parsed records, in file order.
    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    /// Unparsed source row at `index`.
    pub fn raw_row(&self, index: usize) -> Option<&StringRecord> {
        self.raw_rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Ensure every required column is present in the header row.
fn check_columns(headers: &StringRecord) -> Result<(), DatasetError> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|column| !headers.iter().any(|h| h == **column))
        .map(|column| column.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(DatasetError::MissingColumns(missing))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Genre;

    const SAMPLE: &str = include_str!("../../fixtures/bestsellers_sample.csv");

    const HEADER: &str = "Name,Author,Genre,Year,User Rating,Reviews,Price,Price Category,Popularidad,Rating Category,Años en Top,Rating x Review";

    #[test]
    fn test_load_sample_fixture() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 31);
        assert_eq!(dataset.headers().len(), 12);

        let first = &dataset.records()[0];
        assert_eq!(first.name, "Becoming");
        assert_eq!(first.genre, Genre::NonFiction);
        assert_eq!(first.year, 2018);
        assert_eq!(first.reviews, 61133);
        assert_eq!(first.years_in_top, 2);
    }

    #[test]
    fn test_quoted_titles_are_unescaped() {
        let dataset = Dataset::from_reader(SAMPLE.as_bytes()).unwrap();
        let seuss = &dataset.records()[2];
        assert_eq!(seuss.name, "Oh, the Places You'll Go!");
        assert_eq!(dataset.raw_row(2).map(|r| &r[0]), Some("Oh, the Places You'll Go!"));
    }

    #[test]
    fn test_missing_columns_are_reported() {
        let csv = "Name,Author,Genre,Year\nBook,Someone,Fiction,2010\n";
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();

        match err {
            DatasetError::MissingColumns(missing) => {
                assert_eq!(missing.len(), 8);
                assert!(missing.contains(&"User Rating".to_string()));
                assert!(missing.contains(&"Años en Top".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_invalid_row_reports_line() {
        let csv = format!(
            "{HEADER}\nGood,A,Fiction,2010,4.5,10,5,Barato,Media,Bueno,1,45.0\nBad,B,Fiction,not-a-year,4.5,10,5,Barato,Media,Bueno,1,45.0\n"
        );
        let err = Dataset::from_reader(csv.as_bytes()).unwrap_err();

        match err {
            DatasetError::InvalidRow { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_unknown_genre_is_invalid() {
        let csv = format!("{HEADER}\nBook,A,Poetry,2010,4.5,10,5,Barato,Media,Bueno,1,45.0\n");
        assert!(matches!(
            Dataset::from_reader(csv.as_bytes()),
            Err(DatasetError::InvalidRow { .. })
        ));
    }

    #[test]
    fn test_extra_columns_are_kept() {
        let csv = format!("{HEADER},Notes\nBook,A,Fiction,2010,4.5,10,5,Barato,Media,Bueno,1,45.0,keep me\n");
        let dataset = Dataset::from_reader(csv.as_bytes()).unwrap();
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.headers().get(12), Some("Notes"));
        assert_eq!(dataset.raw_row(0).and_then(|r| r.get(12)), Some("keep me"));
    }

    #[test]
    fn test_header_only_file_is_empty_dataset() {
        let dataset = Dataset::from_reader(format!("{HEADER}\n").as_bytes()).unwrap();
        assert!(dataset.is_empty());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Dataset::load(Path::new("does/not/exist.csv"), false).unwrap_err();
        assert!(matches!(err, DatasetError::Io { .. }));
        assert!(err.to_string().contains("does/not/exist.csv"));
    }
}
