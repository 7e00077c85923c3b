//! CSV output sink for canonical tables. Missing cells render as empty
//! fields.

use anyhow::{Context, Result};
use std::path::Path;
use tally_ingest::Table;

pub fn write_csv(table: &Table, path: &Path) -> Result<()> {
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("create {}", path.display()))?;
    write_into(table, &mut wtr)?;
    wtr.flush().with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

/// Render a table as in-memory CSV, used when embedding rows in a prompt.
pub fn to_csv_string(table: &Table) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    write_into(table, &mut wtr)?;
    let buf = wtr
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing csv buffer: {e}"))?;
    Ok(String::from_utf8(buf).context("csv output was not utf-8")?)
}

fn write_into<W: std::io::Write>(table: &Table, wtr: &mut csv::Writer<W>) -> Result<()> {
    wtr.write_record(&table.columns)?;
    for row in &table.rows {
        wtr.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    Ok(())
}
