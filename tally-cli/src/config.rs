use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanned for statement exports.
    pub input_dir: PathBuf,
    /// Directory receiving the combined/categorized CSVs.
    pub output_dir: PathBuf,
    pub gemini: GeminiSection,
    pub taxonomy: Taxonomy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiSection {
    pub model: String,
    pub temperature: f32,
    /// Categorization requests are capped at this many rows to keep the
    /// response from truncating.
    pub max_rows: usize,
}

/// Spending-category taxonomy handed to the categorizer verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Taxonomy {
    pub expense_categories: BTreeMap<String, Vec<String>>,
    /// Vendors expected behind PAYNOW descriptions.
    pub paynow_vendors: Vec<String>,
    /// People whose transfers should be categorized as transfers, not spend.
    pub external_individuals: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let mut expense_categories = BTreeMap::new();
        expense_categories.insert(
            "Food & Dining".to_string(),
            vec!["Restaurants".to_string(), "Groceries".to_string(), "Delivery".to_string()],
        );
        expense_categories.insert(
            "Transport".to_string(),
            vec!["Public Transit".to_string(), "Ride Hailing".to_string(), "Fuel".to_string()],
        );
        expense_categories.insert(
            "Bills & Utilities".to_string(),
            vec!["Telco".to_string(), "Power".to_string(), "Insurance".to_string()],
        );
        expense_categories.insert(
            "Transfers".to_string(),
            vec!["PayNow".to_string(), "Internal".to_string()],
        );

        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
            gemini: GeminiSection {
                model: "gemini-2.0-flash".to_string(),
                temperature: 0.1,
                max_rows: 50,
            },
            taxonomy: Taxonomy {
                expense_categories,
                paynow_vendors: Vec::new(),
                external_individuals: Vec::new(),
            },
        }
    }
}

pub fn tally_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".tally"))
}

pub fn ensure_tally_home() -> Result<PathBuf> {
    let dir = tally_home()?;
    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    Ok(dir)
}

pub fn config_path() -> Result<PathBuf> {
    Ok(ensure_tally_home()?.join("config.toml"))
}

pub fn load_config() -> Result<Config> {
    let p = config_path()?;
    if !p.exists() {
        return Ok(Config::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    Ok(toml::from_str(&s).context("parse config.toml")?)
}

pub fn save_config(cfg: &Config) -> Result<()> {
    let p = config_path()?;
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(&p, s).with_context(|| format!("write {}", p.display()))?;
    Ok(())
}

pub fn init_config() -> Result<()> {
    let p = config_path()?;
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let cfg = Config::default();
        let s = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&s).unwrap();
        assert_eq!(back.gemini.max_rows, 50);
        assert_eq!(back.input_dir, PathBuf::from("input"));
        assert!(back.taxonomy.expense_categories.contains_key("Transport"));
    }
}
