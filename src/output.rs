//! Flat-file persistence for tables and reports.
//!
//! Tables are written as UTF-8 CSV with a header row of column names and no
//! index column. Parent directories are created on demand.

use std::fs::{self, File};
use std::path::Path;

use csv::WriterBuilder;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::Result;
use crate::summary::SummaryStatistics;
use crate::table::{Record, Table, cell_text};

/// Logs summary statistics using Rust's debug pretty-print format.
pub fn print_pretty(stats: &SummaryStatistics) {
    debug!("{:#?}", stats);
}

/// Logs summary statistics as pretty-printed JSON.
pub fn print_json(stats: &SummaryStatistics) -> Result<()> {
    info!("Summary statistics:\n{}", serde_json::to_string_pretty(stats)?);
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

/// Writes `table` to `path`, replacing any existing file.
pub fn persist(table: &Table, path: &Path) -> Result<()> {
    create_parent(path)?;

    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().from_writer(file);

    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(
            table
                .columns()
                .iter()
                .map(|c| row.get(c).map(cell_text).unwrap_or_default()),
        )?;
    }
    writer.flush()?;

    info!(path = %path.display(), records = table.len(), "Table saved");
    Ok(())
}

/// Writes serializable rows (one struct per line) to `path`.
pub fn write_rows<T: Serialize>(rows: &[T], path: &Path) -> Result<()> {
    create_parent(path)?;

    let mut writer = WriterBuilder::new().from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    info!(path = %path.display(), rows = rows.len(), "Rows saved");
    Ok(())
}

/// Serializes `value` as pretty-printed JSON to `path`.
pub fn write_json(value: &impl Serialize, path: &Path) -> Result<()> {
    create_parent(path)?;
    fs::write(path, serde_json::to_vec_pretty(value)?)?;

    info!(path = %path.display(), "JSON saved");
    Ok(())
}

/// Reads a headered CSV into a table. Every cell is kept as text; empty
/// cells become null.
pub fn load_table(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut table = Table::new();
    for result in reader.records() {
        let record = result?;
        let row: Record = headers
            .iter()
            .zip(record.iter())
            .map(|(name, cell)| {
                let value = if cell.is_empty() {
                    Value::Null
                } else {
                    Value::String(cell.to_string())
                };
                (name.to_string(), value)
            })
            .collect();
        table.push(row);
    }

    debug!(path = %path.display(), records = table.len(), "Table loaded");
    Ok(table)
}
