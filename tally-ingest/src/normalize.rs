//! Shared normalization pass applied by every parser before returning.

use crate::schema::{self, ColumnKind};
use crate::table::{Cell, Table};

/// Parse a decimal that may carry thousands separators.
pub fn decimal(raw: &str) -> Option<f64> {
    raw.trim().replace(',', "").parse().ok()
}

/// Two-decimal rendering used for all amount cells.
pub fn format_amount(value: f64) -> String {
    format!("{value:.2}")
}

/// Coercion rule for Deposit/Withdrawal cells, preserved from the source
/// export semantics: a blank cell counts as zero, a non-numeric cell becomes
/// missing (empty in the output), and a missing cell stays missing. The
/// missing/blank split keeps "no transaction on this side" distinct from a
/// true zero-amount transaction.
pub fn coerce_amount(cell: &Cell) -> Cell {
    let raw = cell.as_ref()?;
    if raw.trim().is_empty() {
        return Some(format_amount(0.0));
    }
    decimal(raw).map(format_amount)
}

/// Normalize a table onto the canonical schema:
/// trim column names, trim cells of text-kind columns (unknown columns are
/// treated as text), coerce Deposit/Withdrawal, insert absent standard
/// columns as all-missing, and restrict/reorder to the standard column list.
///
/// Non-standard extra columns (the credit-card foreign-currency pair) are
/// dropped here; callers that need them detach before this pass and reattach
/// after.
pub fn normalize(mut table: Table) -> Table {
    for column in &mut table.columns {
        *column = column.trim().to_string();
    }

    for (j, column) in table.columns.iter().enumerate() {
        let kind = schema::kind_of(column).unwrap_or(ColumnKind::Text);
        if kind != ColumnKind::Text {
            continue;
        }
        for row in &mut table.rows {
            if let Some(cell) = &mut row[j] {
                *cell = cell.trim().to_string();
            }
        }
    }

    for name in [schema::DEPOSIT, schema::WITHDRAWAL] {
        if let Some(j) = table.column_index(name) {
            for row in &mut table.rows {
                row[j] = coerce_amount(&row[j]);
            }
        }
    }

    let mut out = Table::new(
        schema::STANDARD_COLUMNS
            .iter()
            .map(|spec| spec.name.to_string())
            .collect(),
    );
    let indices: Vec<Option<usize>> = schema::STANDARD_COLUMNS
        .iter()
        .map(|spec| table.column_index(spec.name))
        .collect();
    for row in &table.rows {
        let mapped = indices
            .iter()
            .map(|idx| idx.and_then(|j| row[j].clone()))
            .collect();
        out.rows.push(mapped);
    }
    out
}
