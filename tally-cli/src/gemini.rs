//! Gemini generative-language collaborator: transaction categorization and
//! an interactive chat loop.
//!
//! The parsing core never depends on this module; categorization failures
//! are reported to the caller and the batch output stands on its own.

use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{self, Write};
use tally_ingest::Table;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::output;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Request<'a> {
    contents: &'a [Content],
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Content,
}

fn user_turn(text: String) -> Content {
    Content { role: "user".to_string(), parts: vec![Part { text }] }
}

async fn generate(
    model: &str,
    api_key: &str,
    contents: &[Content],
    generation_config: Option<GenerationConfig>,
) -> Result<String> {
    let url = format!("{API_BASE}/{model}:generateContent?key={api_key}");
    let body = Request { contents, generation_config };

    let client = reqwest::Client::new();
    let resp = client
        .post(&url)
        .json(&body)
        .send()
        .await
        .context("gemini request")?;

    let status = resp.status();
    if !status.is_success() {
        let txt = resp.text().await.unwrap_or_default();
        bail!("gemini error: {status} {txt}");
    }

    let out: Response = resp.json().await.context("parse gemini response")?;
    let candidate = out
        .candidates
        .into_iter()
        .next()
        .context("gemini returned no candidates")?;
    let mut text = String::new();
    for part in candidate.content.parts {
        text.push_str(&part.text);
    }
    Ok(text.trim().to_string())
}

/// Ask Gemini to assign `Category`/`Sub-Category` to every row of the
/// table, returning a new table with the two columns appended. The input is
/// row-limited per config to keep the response from truncating.
pub async fn categorize(cfg: &Config, api_key: &str, table: &Table) -> Result<Table> {
    let mut limited = table.clone();
    if limited.len() > cfg.gemini.max_rows {
        warn!(
            "limiting categorization to {} of {} transactions to prevent response truncation",
            cfg.gemini.max_rows,
            limited.len()
        );
        limited.rows.truncate(cfg.gemini.max_rows);
    }

    let csv_data = output::to_csv_string(&limited)?;
    let taxonomy = toml::to_string_pretty(&cfg.taxonomy).context("serialize taxonomy")?;

    let prompt = format!(
        "You are a financial transaction categorizer. I will provide you with a CSV of \
financial transactions and a TOML configuration of expense categories.\n\n\
Here is the TOML configuration for expense categories:\n```toml\n{taxonomy}```\n\n\
Your task is to:\n\
1. Analyze each transaction in the CSV\n\
2. Assign a 'Category' and 'Sub-Category' to each transaction based on the configuration\n\
3. Pay special attention to PayNow transactions (containing \"PAYNOW\" in the description) \
and match them to vendors in the paynow_vendors list\n\
4. Identify transactions to individuals that should be categorized as transfers based on \
the external_individuals list\n\n\
Here is the CSV data:\n```\n{csv_data}```\n\n\
IMPORTANT: Respond ONLY with a valid, complete JSON array. Each object in the array must \
have all the original columns plus 'Category' and 'Sub-Category'. Do not include any \
explanations, markdown formatting, or code blocks in your response. Just return the raw \
JSON array."
    );
    debug!("categorization prompt is {} bytes", prompt.len());

    let generation_config = GenerationConfig {
        temperature: cfg.gemini.temperature,
        top_p: 0.95,
        top_k: 40,
        max_output_tokens: 8192,
        response_mime_type: Some("application/json".to_string()),
    };

    let text = generate(
        &cfg.gemini.model,
        api_key,
        &[user_turn(prompt)],
        Some(generation_config),
    )
    .await?;

    let rows = parse_row_objects(&text)?;
    if rows.len() != limited.len() {
        warn!(
            "categorizer returned {} rows for {} transactions (response truncated?)",
            rows.len(),
            limited.len()
        );
    }
    info!("categorized {} transactions", rows.len());
    table_from_objects(&limited.columns, &rows)
}

/// Strip markdown code fences Gemini sometimes wraps around JSON.
fn strip_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

/// Parse the response body into row objects: straight JSON first, then a
/// best-effort extraction of the outermost array from a noisy reply.
fn parse_row_objects(text: &str) -> Result<Vec<Value>> {
    let cleaned = strip_fences(text);
    let parsed: Value = match serde_json::from_str(&cleaned) {
        Ok(v) => v,
        Err(first_err) => {
            let re = Regex::new(r"(?s)\[\s*\{.*\}\s*\]")?;
            let Some(m) = re.find(&cleaned) else {
                bail!("no JSON array in categorizer response: {first_err}");
            };
            serde_json::from_str(m.as_str()).context("parse extracted JSON array")?
        }
    };

    let Value::Array(rows) = parsed else {
        bail!("categorizer response was not a JSON array");
    };
    if rows.is_empty() {
        bail!("categorizer response held no rows");
    }
    if let Some(bad) = rows.iter().find(|r| !r.is_object()) {
        bail!("categorizer row was not an object: {bad}");
    }
    Ok(rows)
}

fn value_to_cell(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Rebuild a table from response objects: the original columns in their
/// original order, with the two category columns appended.
fn table_from_objects(original_columns: &[String], rows: &[Value]) -> Result<Table> {
    let mut columns = original_columns.to_vec();
    columns.push("Category".to_string());
    columns.push("Sub-Category".to_string());

    let mut out = Table::new(columns);
    for row in rows {
        let obj = row.as_object().context("categorizer row was not an object")?;
        let cells = out
            .columns
            .iter()
            .map(|c| value_to_cell(obj.get(c)))
            .collect();
        out.push_row(cells)?;
    }
    Ok(out)
}

/// Interactive chat REPL against the configured model. Type `exit` to quit.
pub async fn chat(cfg: &Config, api_key: &str) -> Result<()> {
    println!("Gemini chat - type 'exit' to quit.\n");
    let mut history: Vec<Content> = Vec::new();
    let stdin = io::stdin();

    loop {
        print!("You: ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if line.eq_ignore_ascii_case("exit") {
            println!("Goodbye!");
            break;
        }

        history.push(user_turn(line.to_string()));
        let reply = generate(&cfg.gemini.model, api_key, &history, None).await?;
        println!("Gemini: {reply}\n");
        history.push(Content {
            role: "model".to_string(),
            parts: vec![Part { text: reply }],
        });
    }
    Ok(())
}
