//! Canonical transaction schema shared by every statement parser.
//!
//! All parsers project their vendor format onto this fixed column set; the
//! batch runner relies on that to concatenate tables from different banks.

use anyhow::{Context, Result};
use chrono::NaiveDate;

/// Semantic type of a canonical column. Trimming applies to text columns
/// only; amount coercion applies to decimal columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Date,
    Decimal,
}

#[derive(Debug, Clone, Copy)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
}

pub const FINANCIAL_INSTITUTION: &str = "Financial Institution";
pub const ACCOUNT_NAME: &str = "Account Name";
pub const ACCOUNT_NUMBER: &str = "Account Number";
pub const DATE: &str = "Date";
pub const TRANSACTION: &str = "Transaction";
pub const CURRENCY: &str = "Currency";
pub const DEPOSIT: &str = "Deposit";
pub const WITHDRAWAL: &str = "Withdrawal";
pub const RUNNING_BALANCE: &str = "Running Balance";

/// Extra columns carried by credit-card sources, appended after the
/// standard columns.
pub const FOREIGN_CURRENCY: &str = "Foreign Currency";
pub const FOREIGN_AMOUNT: &str = "Foreign Amount";

/// The canonical column list, in output order.
pub const STANDARD_COLUMNS: &[ColumnSpec] = &[
    ColumnSpec { name: FINANCIAL_INSTITUTION, kind: ColumnKind::Text },
    ColumnSpec { name: ACCOUNT_NAME, kind: ColumnKind::Text },
    ColumnSpec { name: ACCOUNT_NUMBER, kind: ColumnKind::Text },
    ColumnSpec { name: DATE, kind: ColumnKind::Date },
    ColumnSpec { name: TRANSACTION, kind: ColumnKind::Text },
    ColumnSpec { name: CURRENCY, kind: ColumnKind::Text },
    ColumnSpec { name: DEPOSIT, kind: ColumnKind::Decimal },
    ColumnSpec { name: WITHDRAWAL, kind: ColumnKind::Decimal },
    ColumnSpec { name: RUNNING_BALANCE, kind: ColumnKind::Decimal },
];

/// Statement rows carry dates as day/month/year.
pub const DATE_INPUT_FORMAT: &str = "%d/%m/%Y";
/// Canonical rendering used in output tables.
pub const DATE_OUTPUT_FORMAT: &str = "%Y-%m-%d";

pub fn kind_of(column: &str) -> Option<ColumnKind> {
    STANDARD_COLUMNS
        .iter()
        .find(|spec| spec.name == column)
        .map(|spec| spec.kind)
}

/// Parse a statement date and re-render it canonically. Date failures are
/// fatal for the containing file, never silently defaulted.
pub fn reformat_date(raw: &str) -> Result<String> {
    let date = NaiveDate::parse_from_str(raw.trim(), DATE_INPUT_FORMAT)
        .with_context(|| format!("invalid date {raw:?} (expected {DATE_INPUT_FORMAT})"))?;
    Ok(date.format(DATE_OUTPUT_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reformat_date() {
        assert_eq!(reformat_date("05/02/2024").unwrap(), "2024-02-05");
        assert_eq!(reformat_date(" 31/12/2023 ").unwrap(), "2023-12-31");
        assert!(reformat_date("2024-02-05").is_err());
        assert!(reformat_date("31/02/2024").is_err());
        assert!(reformat_date("").is_err());
    }

    #[test]
    fn test_kind_of() {
        assert_eq!(kind_of(TRANSACTION), Some(ColumnKind::Text));
        assert_eq!(kind_of(DATE), Some(ColumnKind::Date));
        assert_eq!(kind_of(DEPOSIT), Some(ColumnKind::Decimal));
        assert_eq!(kind_of("DESCRIPTION"), None);
    }
}
