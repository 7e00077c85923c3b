//! Standard Chartered credit-card statement parser (Journey card).
//!
//! Looser layout than the account export: blank lines are interspersed, the
//! holder/number line floats near the top, and the transaction section ends
//! at a `Current Balance` sentinel. Rows have no header; the columns are
//! always `Date, DESCRIPTION, Foreign Currency Amount, SGD Amount`.

use anyhow::{Context, Result, bail};
use csv::{ReaderBuilder, Trim};
use regex::Regex;
use std::fs;
use std::path::Path;
use tracing::{debug, error, info};

use crate::normalize::{self, decimal, format_amount};
use crate::schema;
use crate::table::{Cell, Table};

pub const INSTITUTION: &str = "Standard Chartered";

const SENTINEL: &str = "Current Balance";
const SYNTHETIC_HEADER: &str = "Date,DESCRIPTION,Foreign Currency Amount,SGD Amount";
/// Header lines above the transaction section, counted after blank-line
/// stripping.
const SKIP_LINES: usize = 3;

/// Parse a credit-card statement into a canonical table with the two
/// foreign-currency columns appended.
///
/// Unlike the account parser there is no row-level recovery: any failure is
/// logged and fails the whole file.
pub fn parse_credit_card_csv(path: &Path) -> Result<Table> {
    match parse_inner(path) {
        Ok(table) => Ok(table),
        Err(e) => {
            error!("{}: credit-card statement parse failed: {e:#}", path.display());
            Err(e)
        }
    }
}

fn parse_inner(path: &Path) -> Result<Table> {
    info!("processing credit-card statement: {}", path.display());

    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    let meta_line = lines
        .first()
        .with_context(|| format!("{}: statement is empty", path.display()))?;
    let (account_name, account_number) = card_meta(meta_line)
        .with_context(|| format!("{}: malformed account header", path.display()))?;
    info!("account details: {account_name}, {account_number}");

    let mut txn_lines = Vec::new();
    let mut sentinel_seen = false;
    for line in lines.iter().skip(SKIP_LINES) {
        if line.starts_with(SENTINEL) {
            sentinel_seen = true;
            break;
        }
        if line.contains(',') {
            txn_lines.push(*line);
        }
    }
    if !sentinel_seen {
        bail!("{}: no {SENTINEL:?} line found", path.display());
    }
    debug!("found {} transaction lines", txn_lines.len());

    let mut body = String::from(SYNTHETIC_HEADER);
    for line in &txn_lines {
        body.push('\n');
        body.push_str(line);
    }

    let sgd_re = Regex::new(r"SGD\s*([\d,.]+)\s*(DR|CR)?")?;
    let code_re = Regex::new(r"[A-Z]{3}")?;
    let amount_re = Regex::new(r"[0-9,.]+")?;

    let mut table = Table::new(vec![
        schema::DATE.to_string(),
        schema::TRANSACTION.to_string(),
        schema::DEPOSIT.to_string(),
        schema::WITHDRAWAL.to_string(),
    ]);
    let mut foreign_currency: Vec<Cell> = Vec::new();
    let mut foreign_amount: Vec<Cell> = Vec::new();

    let mut rdr = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());
    for result in rdr.records() {
        let record = result.context("reading transaction row")?;

        let date = schema::reformat_date(record.get(0).unwrap_or(""))
            .with_context(|| format!("in {}", path.display()))?;
        let description = record.get(1).unwrap_or("").trim().to_string();

        let (code, foreign) =
            split_foreign(&code_re, &amount_re, record.get(2).unwrap_or(""));
        foreign_currency.push(code);
        foreign_amount.push(foreign);

        // Signed SGD amount routes the row: credit -> Deposit, debit ->
        // Withdrawal (absolute value). Zero or unrecognized leaves both empty.
        let (deposit, withdrawal) = match split_sgd(&sgd_re, record.get(3).unwrap_or("")) {
            Some(a) if a > 0.0 => (Some(format_amount(a)), None),
            Some(a) if a < 0.0 => (None, Some(format_amount(-a))),
            _ => (None, None),
        };

        table.push_row(vec![Some(date), Some(description), deposit, withdrawal])?;
    }

    table.push_constant_column(schema::ACCOUNT_NAME, &account_name);
    table.push_constant_column(schema::ACCOUNT_NUMBER, &account_number);
    table.push_constant_column(schema::FINANCIAL_INSTITUTION, INSTITUTION);
    table.push_constant_column(schema::CURRENCY, "SGD");

    let mut out = normalize::normalize(table);
    out.push_column(schema::FOREIGN_CURRENCY, foreign_currency)?;
    out.push_column(schema::FOREIGN_AMOUNT, foreign_amount)?;

    info!("{}: parsed {} transactions", path.display(), out.len());
    Ok(out)
}

/// Extract holder name and account number from the first non-empty line.
/// The number is wrapped in quote characters on both sides.
fn card_meta(line: &str) -> Result<(String, String)> {
    let parts: Vec<&str> = line.split(',').collect();
    if parts.len() < 2 {
        bail!("expected \"<name>, '<number>'\", got {line:?}");
    }
    let name = parts[0].trim().to_string();
    let number = parts[1].trim().trim_matches('\'').to_string();
    Ok((name, number))
}

/// `"USD 30.00"` -> `(Some("USD"), Some("30.00"))`. A blank cell leaves both
/// missing; a cell matching only one of the patterns fills just that side.
fn split_foreign(code_re: &Regex, amount_re: &Regex, raw: &str) -> (Cell, Cell) {
    if raw.trim().is_empty() {
        return (None, None);
    }
    let code = code_re.find(raw).map(|m| m.as_str().to_string());
    let amount = amount_re
        .find(raw)
        .and_then(|m| decimal(m.as_str()))
        .map(format_amount);
    (code, amount)
}

/// `"SGD 45.00 DR"` -> `Some(-45.0)`. A missing DR/CR marker means credit;
/// a cell that doesn't match the pattern yields `None`.
fn split_sgd(re: &Regex, raw: &str) -> Option<f64> {
    let caps = re.captures(raw)?;
    let mut amount = decimal(caps.get(1)?.as_str())?;
    if caps.get(2).map(|m| m.as_str()) == Some("DR") {
        amount = -amount;
    }
    Some(amount)
}
