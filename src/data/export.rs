use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use arrow::util::pretty::pretty_format_batches;
use parquet::arrow::ArrowWriter;

use super::model::LineTable;
use crate::error::{HitranError, Result};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write a line table to a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`              – one header row, one row per line
/// * `.json`             – `[{ "Wavenumber": ..., "Band": ..., ... }, ...]`
/// * `.parquet` / `.pq`  – flat Parquet file with the same columns
pub fn save_table(table: &LineTable, path: &Path) -> Result<()> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => save_csv(table, path),
        "json" => save_json(table, path),
        "parquet" | "pq" => save_parquet(table, path),
        other => Err(HitranError::UnsupportedFormat(format!(".{other}"))),
    }?;
    log::info!("wrote {} lines to {}", table.len(), path.display());
    Ok(())
}

/// The first `n` rows rendered as a text table.
pub fn preview(table: &LineTable, n: usize) -> Result<String> {
    let batch = table.head(n).to_record_batch()?;
    Ok(pretty_format_batches(&[batch])?.to_string())
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| HitranError::io(path, e))
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn save_csv(table: &LineTable, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_writer(create(path)?);
    if table.is_empty() {
        // serde only emits the header alongside the first record
        writer.write_record(table.column_names())?;
    }
    for row in table {
        writer.serialize(row)?;
    }
    writer.flush().map_err(|e| HitranError::io(path, e))
}

fn save_json(table: &LineTable, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(create(path)?);
    serde_json::to_writer_pretty(&mut writer, table.rows())?;
    writer.flush().map_err(|e| HitranError::io(path, e))
}

fn save_parquet(table: &LineTable, path: &Path) -> Result<()> {
    let batch = table.to_record_batch()?;
    let mut writer = ArrowWriter::try_new(create(path)?, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    Ok(())
}
