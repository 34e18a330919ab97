//! Filtered-data CSV export.
//!
//! The export reproduces the source header and the selected rows exactly as
//! they were read, so re-loading it yields the same records.

use crate::dataset::FilteredView;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Default file name for the filtered export.
pub const DEFAULT_EXPORT_NAME: &str = "datos_filtrados.csv";

/// Write the filtered rows as CSV to any writer.
pub fn write_csv<W: Write>(view: &FilteredView<'_>, writer: W) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer
        .write_record(view.dataset().headers())
        .context("Failed to write CSV header")?;

    for row in view.raw_rows() {
        csv_writer
            .write_record(row)
            .context("Failed to write CSV row")?;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(())
}

/// The filtered rows as UTF-8 CSV bytes (the download payload).
pub fn to_csv_bytes(view: &FilteredView<'_>) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    write_csv(view, &mut buffer)?;
    Ok(buffer)
}

/// Write the filtered rows to a CSV file.
pub fn write_filtered_csv(view: &FilteredView<'_>, path: &Path) -> Result<()> {
    let bytes = to_csv_bytes(view)?;
    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write filtered data to {}", path.display()))?;

    info!("Exported {} rows to {}", view.len(), path.display());
    Ok(())
}
