//! Directory-level batch runner: one parse per file, failures isolated.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::{error, info, warn};

use crate::detect;
use crate::table::Table;

#[derive(Debug, Default)]
pub struct BatchSummary {
    /// All successfully parsed rows, concatenated in processing order.
    pub table: Table,
    pub files_ok: usize,
    pub files_failed: usize,
}

/// Parse every regular file in `dir` (directory listing order, not sorted)
/// and concatenate the results into one canonical table. A failing file is
/// logged with its error chain and skipped; a single bad file never aborts
/// the batch. Only an unreadable directory is fatal.
pub fn run_dir(dir: &Path) -> Result<BatchSummary> {
    info!("starting batch over {}", dir.display());
    let mut summary = BatchSummary::default();

    let entries =
        fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("reading directory {}", dir.display()))?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();

        match detect::parser_for_path(&path).and_then(|kind| kind.parse(&path)) {
            Ok(table) if table.is_empty() => {
                warn!("no transactions found in {name}");
                summary.files_ok += 1;
            }
            Ok(table) => {
                info!("successfully processed {} transactions from {name}", table.len());
                summary.table.append(table);
                summary.files_ok += 1;
            }
            Err(e) => {
                error!("error processing {name}: {e:#}");
                summary.files_failed += 1;
            }
        }
    }

    info!(
        "batch complete: {} rows from {} files ({} failed)",
        summary.table.len(),
        summary.files_ok,
        summary.files_failed
    );
    Ok(summary)
}
