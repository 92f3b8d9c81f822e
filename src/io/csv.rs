//! CSV output for the flat (geometry-less) intersection tables.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use polars::frame::DataFrame;
use polars::io::SerWriter;
use polars::prelude::CsvWriter;

use crate::common;

/// Write a DataFrame to a CSV file, creating parent directories as needed.
pub fn write_table(table: &DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        common::ensure_dir_exists(parent)?;
    }
    let file = File::create(path)
        .with_context(|| format!("failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(&mut table.clone())
        .with_context(|| format!("failed to write CSV to {}", path.display()))
}
