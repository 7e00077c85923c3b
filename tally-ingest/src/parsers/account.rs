//! Standard Chartered account statement parser (savings/current/deposit).
//!
//! Fixed physical layout:
//!   lines 0-2  report metadata (ignored)
//!   line 3     `<holder name>, '<account number>`
//!   line 4     column header row
//!   line 5+    fully-quoted transaction rows

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, Trim};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::normalize::{self, decimal, format_amount};
use crate::schema;
use crate::table::Table;

pub const INSTITUTION: &str = "Standard Chartered";

const META_LINE: usize = 3;
const COLUMN_HEADER_LINE: usize = 4;

/// Parse an account statement into a canonical table.
///
/// Malformed body rows are logged and skipped; an unreadable file, a
/// malformed header, or an unparsable date fails the whole file.
pub fn parse_account_csv(path: &Path) -> Result<Table> {
    info!("processing account statement: {}", path.display());

    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lines: Vec<&str> = text.lines().collect();
    if lines.len() <= COLUMN_HEADER_LINE {
        bail!(
            "{}: too short for an account statement ({} lines)",
            path.display(),
            lines.len()
        );
    }

    let (account_name, account_number) = account_meta(lines[META_LINE])
        .with_context(|| format!("{}: malformed account header", path.display()))?;

    let body = lines[COLUMN_HEADER_LINE..].join("\n");
    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = rdr
        .headers()
        .with_context(|| format!("{}: unreadable column header", path.display()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let width = headers.len();
    let mut table = Table::new(headers);

    for (i, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {e}", path.display(), i + 1);
                continue;
            }
        };
        if record.len() != width {
            warn!(
                "{}: skipping row {} with {} fields (expected {width})",
                path.display(),
                i + 1,
                record.len()
            );
            continue;
        }
        let cells = record.iter().map(|f| Some(f.to_string())).collect();
        table.push_row(cells)?;
    }

    table.push_constant_column(schema::ACCOUNT_NAME, &account_name);
    table.push_constant_column(schema::ACCOUNT_NUMBER, &account_number);
    table.push_constant_column(schema::FINANCIAL_INSTITUTION, INSTITUTION);

    let date_idx = table
        .column_index(schema::DATE)
        .with_context(|| format!("{}: no Date column", path.display()))?;
    for row in &mut table.rows {
        let raw = row[date_idx].take().unwrap_or_default();
        let canonical =
            schema::reformat_date(&raw).with_context(|| format!("in {}", path.display()))?;
        row[date_idx] = Some(canonical);
    }

    if let Some(bal_idx) = table.column_index(schema::RUNNING_BALANCE) {
        for row in &mut table.rows {
            row[bal_idx] = row[bal_idx].take().and_then(|raw| clean_balance(&raw));
        }
    }

    info!("{}: parsed {} transactions", path.display(), table.len());
    Ok(normalize::normalize(table))
}

/// Extract holder name and account number from the metadata line. The export
/// prefixes the number with a quote character, which gets stripped.
fn account_meta(line: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        bail!("expected \"<name>, <number>\", got {line:?}");
    }
    let name = parts[0].trim().to_string();
    let mut number = parts[1].trim().chars();
    number.next();
    Ok((name, number.as_str().to_string()))
}

/// Drop the ` CR`/` DR` suffix and thousands separators, then coerce. The
/// suffix only gets stripped; it never flips the sign of the balance.
fn clean_balance(raw: &str) -> Option<String> {
    let s = raw
        .trim()
        .trim_end_matches(" CR")
        .trim_end_matches(" DR")
        .trim();
    decimal(s).map(format_amount)
}
