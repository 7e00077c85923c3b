use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod auth;
mod config;
mod gemini;
mod output;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Bank statement ingestion and categorization")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every statement in the input directory and write the combined CSV
    Run {
        /// Override the configured input directory
        #[arg(long)]
        input_dir: Option<PathBuf>,

        /// Override the configured output directory
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Send the combined table to Gemini for categorization
        #[arg(long)]
        categorize: bool,

        /// Max rows sent to the categorizer (overrides config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// API credential management
    Auth {
        #[command(subcommand)]
        command: AuthCommand,
    },

    /// Interactive Gemini chat (type 'exit' to quit)
    Chat,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config file to ~/.tally/config.toml
    Init,
}

#[derive(Subcommand, Debug)]
enum AuthCommand {
    /// Store a Gemini API key in ~/.tally/auth.json
    PasteGeminiKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Run { input_dir, output_dir, categorize, limit } => {
            run(input_dir, output_dir, categorize, limit).await
        }
        Command::Config { command: ConfigCommand::Init } => config::init_config(),
        Command::Auth { command: AuthCommand::PasteGeminiKey } => auth::paste_gemini_key(),
        Command::Chat => chat().await,
    }
}

async fn run(
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    categorize: bool,
    limit: Option<usize>,
) -> Result<()> {
    let mut cfg = config::load_config()?;
    if let Some(dir) = input_dir {
        cfg.input_dir = dir;
    }
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    if let Some(limit) = limit {
        cfg.gemini.max_rows = limit;
    }

    let summary = tally_ingest::run_dir(&cfg.input_dir)?;
    if summary.table.is_empty() {
        warn!("no transactions were processed successfully");
        return Ok(());
    }

    std::fs::create_dir_all(&cfg.output_dir)
        .with_context(|| format!("create {}", cfg.output_dir.display()))?;
    let combined = cfg.output_dir.join("combined_transactions.csv");
    output::write_csv(&summary.table, &combined)?;
    info!(
        "saved {} transactions to {}",
        summary.table.len(),
        combined.display()
    );

    if !categorize {
        return Ok(());
    }

    let Some(key) = auth::gemini_api_key()? else {
        warn!(
            "no Gemini API key configured; skipping categorization \
             (run: tally auth paste-gemini-key)"
        );
        return Ok(());
    };

    match gemini::categorize(&cfg, &key, &summary.table).await {
        Ok(categorized) => {
            let path = cfg.output_dir.join("categorized_transactions.csv");
            output::write_csv(&categorized, &path)?;
            info!(
                "saved {} categorized transactions to {}",
                categorized.len(),
                path.display()
            );
        }
        // Categorization failing never invalidates the combined output.
        Err(e) => error!("categorization failed: {e:#}"),
    }

    Ok(())
}

async fn chat() -> Result<()> {
    let cfg = config::load_config()?;
    let Some(key) = auth::gemini_api_key()? else {
        bail!("no Gemini API key configured; run: tally auth paste-gemini-key");
    };
    gemini::chat(&cfg, &key).await
}
