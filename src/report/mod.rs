//! Tabular reports.
//!
//! Every report is a UTF-8, comma-delimited CSV with a header row, written
//! even when there are no data rows.

pub mod rows;

use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use rows::{ComparisonRow, GeneratedOverviewRow, GeneratedScene, SummaryRow};

use crate::domain::SceneStatistic;

/// A row type with a fixed CSV header
pub trait CsvRecord: Serialize + DeserializeOwned {
    const HEADERS: &'static [&'static str];
}

impl CsvRecord for SceneStatistic {
    const HEADERS: &'static [&'static str] = &["scene_file", "num_lines", "num_speakers"];
}

/// Write `rows` to `path`, creating parent directories
pub fn write_rows<T: CsvRecord>(path: &Path, rows: &[T]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create CSV file: {}", path.display()))?;

    writer
        .write_record(T::HEADERS)
        .with_context(|| format!("Failed to write CSV header: {}", path.display()))?;
    for row in rows {
        writer
            .serialize(row)
            .with_context(|| format!("Failed to write CSV row: {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file: {}", path.display()))?;

    Ok(())
}

/// Read all rows of a CSV file with a header row
pub fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file: {}", path.display()))?;

    reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Failed to parse row {} of {}", i + 1, path.display())))
        .collect()
}
