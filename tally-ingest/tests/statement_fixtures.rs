//! End-to-end parses of committed fixture statements, covering the batch
//! runner's failure isolation and the per-format scenarios.

use std::fs;
use std::path::PathBuf;

use tally_ingest::schema;
use tally_ingest::{ParserKind, parser_for_path, run_dir};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/data")
        .join(name)
}

fn account_fixture() -> PathBuf {
    fixture("StandardChartered_ESaver_Feb2024.csv")
}

fn card_fixture() -> PathBuf {
    fixture("Journey_Card_Feb2024.csv")
}

fn cell<'a>(table: &'a tally_ingest::Table, row: usize, column: &str) -> Option<&'a str> {
    table.cell(row, column).unwrap().as_deref()
}

#[test]
fn test_account_fixture_end_to_end() {
    let path = account_fixture();
    let kind = parser_for_path(&path).unwrap();
    assert_eq!(kind, ParserKind::Account);

    let table = kind.parse(&path).unwrap();
    assert_eq!(table.len(), 3);

    let names: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    let expected: Vec<&str> = schema::STANDARD_COLUMNS.iter().map(|s| s.name).collect();
    assert_eq!(names, expected);

    // Header metadata is stamped onto every row.
    for row in 0..table.len() {
        assert_eq!(cell(&table, row, schema::ACCOUNT_NAME), Some("John Doe"));
        assert_eq!(cell(&table, row, schema::ACCOUNT_NUMBER), Some("ACC123456"));
        assert_eq!(
            cell(&table, row, schema::FINANCIAL_INSTITUTION),
            Some("Standard Chartered")
        );
    }

    assert_eq!(cell(&table, 0, schema::DATE), Some("2024-02-01"));
    assert_eq!(
        cell(&table, 0, schema::TRANSACTION),
        Some("FAST TRANSFER FROM JANE DOE")
    );
    assert_eq!(cell(&table, 0, schema::DEPOSIT), Some("2500.00"));
    // Blank source cell coerces to zero, not to missing.
    assert_eq!(cell(&table, 0, schema::WITHDRAWAL), Some("0.00"));
    assert_eq!(cell(&table, 0, schema::RUNNING_BALANCE), Some("3734.56"));

    assert_eq!(cell(&table, 1, schema::DEPOSIT), Some("0.00"));
    assert_eq!(cell(&table, 1, schema::WITHDRAWAL), Some("50.00"));
    assert_eq!(cell(&table, 2, schema::RUNNING_BALANCE), Some("3564.16"));
}

#[test]
fn test_account_parse_is_deterministic() {
    let path = account_fixture();
    let first = ParserKind::Account.parse(&path).unwrap();
    let second = ParserKind::Account.parse(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_credit_card_fixture_end_to_end() {
    let path = card_fixture();
    let kind = parser_for_path(&path).unwrap();
    assert_eq!(kind, ParserKind::CreditCard);

    let table = kind.parse(&path).unwrap();
    assert_eq!(table.len(), 5);

    // Standard columns first, foreign-currency pair appended.
    let names: Vec<&str> = table.columns.iter().map(String::as_str).collect();
    let mut expected: Vec<&str> = schema::STANDARD_COLUMNS.iter().map(|s| s.name).collect();
    expected.push(schema::FOREIGN_CURRENCY);
    expected.push(schema::FOREIGN_AMOUNT);
    assert_eq!(names, expected);

    for row in 0..table.len() {
        assert_eq!(cell(&table, row, schema::ACCOUNT_NAME), Some("John Doe"));
        assert_eq!(
            cell(&table, row, schema::ACCOUNT_NUMBER),
            Some("4111-XXXX-XXXX-1234")
        );
        assert_eq!(cell(&table, row, schema::CURRENCY), Some("SGD"));
        assert_eq!(cell(&table, row, schema::RUNNING_BALANCE), None);
    }

    // DR routes to Withdrawal as an absolute value.
    assert_eq!(cell(&table, 0, schema::DATE), Some("2024-02-01"));
    assert_eq!(cell(&table, 0, schema::WITHDRAWAL), Some("45.00"));
    assert_eq!(cell(&table, 0, schema::DEPOSIT), None);

    // Foreign-currency annotation splits into code and amount.
    assert_eq!(cell(&table, 1, schema::FOREIGN_CURRENCY), Some("USD"));
    assert_eq!(cell(&table, 1, schema::FOREIGN_AMOUNT), Some("30.00"));
    assert_eq!(cell(&table, 0, schema::FOREIGN_CURRENCY), None);
    assert_eq!(cell(&table, 0, schema::FOREIGN_AMOUNT), None);

    // CR routes to Deposit.
    assert_eq!(cell(&table, 2, schema::DEPOSIT), Some("500.00"));
    assert_eq!(cell(&table, 2, schema::WITHDRAWAL), None);

    // No marker implies credit.
    assert_eq!(cell(&table, 3, schema::DEPOSIT), Some("12.30"));

    // Thousands separators in both amount columns.
    assert_eq!(cell(&table, 4, schema::WITHDRAWAL), Some("1680.00"));
    assert_eq!(cell(&table, 4, schema::FOREIGN_AMOUNT), Some("1234.50"));
}

#[test]
fn test_credit_card_rows_populate_exactly_one_side() {
    let table = ParserKind::CreditCard.parse(&card_fixture()).unwrap();
    for row in 0..table.len() {
        let deposit = cell(&table, row, schema::DEPOSIT);
        let withdrawal = cell(&table, row, schema::WITHDRAWAL);
        assert!(
            deposit.is_some() ^ withdrawal.is_some(),
            "row {row}: deposit={deposit:?} withdrawal={withdrawal:?}"
        );
    }
}

#[test]
fn test_batch_isolates_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    for name in [
        "StandardChartered_ESaver_Feb2024.csv",
        "Journey_Card_Feb2024.csv",
    ] {
        fs::copy(fixture(name), dir.path().join(name)).unwrap();
    }
    fs::write(dir.path().join("scb_corrupt.csv"), "not,a\nstatement\n").unwrap();

    let summary = run_dir(dir.path()).unwrap();
    assert_eq!(summary.files_ok, 2);
    assert_eq!(summary.files_failed, 1);
    assert_eq!(summary.table.len(), 8);

    // The accumulator keeps the standard columns in front and carries the
    // credit-card extras at the end, whatever the processing order.
    let names: Vec<&str> = summary.table.columns.iter().map(String::as_str).collect();
    let std_names: Vec<&str> = schema::STANDARD_COLUMNS.iter().map(|s| s.name).collect();
    assert_eq!(&names[..std_names.len()], &std_names[..]);
    assert_eq!(names.len(), std_names.len() + 2);
}

#[test]
fn test_batch_over_empty_directory() {
    let dir = tempfile::tempdir().unwrap();
    let summary = run_dir(dir.path()).unwrap();
    assert!(summary.table.is_empty());
    assert_eq!(summary.files_ok, 0);
    assert_eq!(summary.files_failed, 0);
}
