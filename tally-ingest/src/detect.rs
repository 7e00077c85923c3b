//! Pick a statement parser from a file path.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::parsers;
use crate::table::Table;

/// The closed set of supported statement formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParserKind {
    Account,
    CreditCard,
}

impl ParserKind {
    pub fn name(self) -> &'static str {
        match self {
            ParserKind::Account => "account",
            ParserKind::CreditCard => "credit-card",
        }
    }

    /// Run the matching parser against a statement file.
    pub fn parse(self, path: &Path) -> Result<Table> {
        match self {
            ParserKind::Account => parsers::account::parse_account_csv(path),
            ParserKind::CreditCard => parsers::credit_card::parse_credit_card_csv(path),
        }
    }
}

/// File-name tokens that route to the account-statement parser.
const ACCOUNT_TOKENS: &[&str] = &["standardchartered", "scb", "bonussaver", "daily", "esaver"];
/// File-name tokens that route to the credit-card parser.
const CREDIT_CARD_TOKENS: &[&str] = &["journey"];

/// Select a parser for `path` by case-insensitive substring match on the
/// path. Unknown names fall back to the account parser; the only failure is
/// a non-CSV extension. Pure: no I/O, the file need not exist.
pub fn parser_for_path(path: &Path) -> Result<ParserKind> {
    let lowered = path.to_string_lossy().to_lowercase();

    if !lowered.ends_with(".csv") {
        bail!("unsupported file format: {}", path.display());
    }

    if ACCOUNT_TOKENS.iter().any(|t| lowered.contains(t)) {
        return Ok(ParserKind::Account);
    }
    if CREDIT_CARD_TOKENS.iter().any(|t| lowered.contains(t)) {
        return Ok(ParserKind::CreditCard);
    }

    Ok(ParserKind::Account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn detect(name: &str) -> Result<ParserKind> {
        parser_for_path(&PathBuf::from(name))
    }

    #[test]
    fn test_account_tokens() {
        assert_eq!(detect("StandardChartered_Jan.csv").unwrap(), ParserKind::Account);
        assert_eq!(detect("scb-export.csv").unwrap(), ParserKind::Account);
        assert_eq!(detect("BonusSaver_2024.csv").unwrap(), ParserKind::Account);
        assert_eq!(detect("eSaver-feb.csv").unwrap(), ParserKind::Account);
    }

    #[test]
    fn test_credit_card_token() {
        assert_eq!(detect("Journey_Card_Feb.csv").unwrap(), ParserKind::CreditCard);
        assert_eq!(detect("statements/JOURNEY.csv").unwrap(), ParserKind::CreditCard);
    }

    #[test]
    fn test_unknown_name_defaults_to_account() {
        assert_eq!(detect("mystery-bank.csv").unwrap(), ParserKind::Account);
    }

    #[test]
    fn test_rejects_non_csv_extension() {
        assert!(detect("statement.xlsx").is_err());
        assert!(detect("journey.pdf").is_err());
        assert!(detect("").is_err());
    }

    #[test]
    fn test_total_over_odd_inputs() {
        // Never panics, whatever the string looks like.
        for name in ["....csv", "no extension", "journey.csv.bak", "🦀.csv", ".csv"] {
            let _ = detect(name);
        }
        assert_eq!(detect("🦀.csv").unwrap(), ParserKind::Account);
        assert!(detect("journey.csv.bak").is_err());
    }
}
