//! verity-cli — terminal client for the Verity HTTP API
//!
//! # Subcommands
//! - `assess <text> [--json]` — credibility verdict for a headline or article
//! - `status`                 — show server health

use clap::{Parser, Subcommand};
use serde::Deserialize;

const DEFAULT_SERVER: &str = "http://127.0.0.1:7860";

/// Characters of each reference article shown in the human summary.
const MATCH_PREVIEW_CHARS: usize = 80;

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Debug, Parser)]
#[command(name = "verity-cli", version, about = "News credibility checks from the terminal")]
struct Cli {
    /// Verity HTTP server URL (overrides VERITY_HTTP_URL env var)
    #[arg(long, env = "VERITY_HTTP_URL", default_value = DEFAULT_SERVER)]
    server: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Assess the credibility of a headline or article
    Assess {
        /// News text to assess
        text: String,

        /// Print the raw JSON verdict
        #[arg(long)]
        json: bool,
    },

    /// Show Verity server status
    Status,
}

// ============================================================================
// API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiMatch {
    pub text: String,
    pub label: String,
    pub score: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiClassification {
    pub label: String,
    pub confidence: f64,
}

#[derive(Debug, Deserialize)]
pub struct ApiVerdict {
    pub label: String,
    pub confidence: f64,
    pub bucket: String,
    pub classification: ApiClassification,
    pub agreement: f64,
    pub matches: Vec<ApiMatch>,
    pub recommendations: Vec<String>,
}

/// Body of a successful POST /assess
#[derive(Debug, Deserialize)]
pub struct AssessResponse {
    pub verdict: ApiVerdict,
    pub took_ms: Option<u64>,
}

/// Body of a failed POST /assess
#[derive(Debug, Deserialize)]
pub struct ApiError {
    pub error: String,
    pub kind: Option<String>,
}

// ============================================================================
// Formatting
// ============================================================================

fn headline(label: &str) -> &'static str {
    match label {
        "real" => "LIKELY CREDIBLE",
        "fake" => "POTENTIALLY MISLEADING",
        _ => "UNKNOWN",
    }
}

/// Human-readable summary of a verdict.
pub fn format_summary(resp: &AssessResponse) -> String {
    let v = &resp.verdict;
    let mut out = String::new();

    out.push_str(&format!(
        "{}  ({:.1}% confidence, {})\n",
        headline(&v.label),
        v.confidence * 100.0,
        v.bucket
    ));
    out.push_str(&format!(
        "Classifier: {} at {:.1}%  |  Reference agreement: {:.0}%\n",
        v.classification.label,
        v.classification.confidence * 100.0,
        v.agreement * 100.0
    ));

    if !v.matches.is_empty() {
        out.push_str("\nSimilar reference articles:\n");
        for m in &v.matches {
            let mut preview: String = m.text.chars().take(MATCH_PREVIEW_CHARS).collect();
            if m.text.chars().count() > MATCH_PREVIEW_CHARS {
                preview.push_str("...");
            }
            out.push_str(&format!(
                "  {:>3.0}%  [{}] {}\n",
                m.score * 100.0,
                m.label,
                preview
            ));
        }
    }

    if !v.recommendations.is_empty() {
        out.push_str("\nRecommendations:\n");
        for r in &v.recommendations {
            out.push_str(&format!("  - {}\n", r));
        }
    }

    if let Some(ms) = resp.took_ms {
        out.push_str(&format!("\n({} ms)\n", ms));
    }
    out
}

// ============================================================================
// HTTP Client Calls
// ============================================================================

fn do_assess(server: &str, text: &str, json_output: bool) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let url = format!("{}/assess", server);
    let body = serde_json::json!({ "text": text });

    let resp = match client.post(&url).json(&body).send() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("verity-cli: connection failed to {}: {}", url, e);
            std::process::exit(1);
        }
    };

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        match serde_json::from_str::<ApiError>(&body) {
            Ok(err) => eprintln!(
                "verity-cli: {} ({})",
                err.error,
                err.kind.as_deref().unwrap_or("error")
            ),
            Err(_) => eprintln!("verity-cli: server returned {}: {}", status, body),
        }
        std::process::exit(1);
    }

    if json_output {
        let raw: serde_json::Value = resp.json()?;
        println!("{}", serde_json::to_string_pretty(&raw["verdict"])?);
        return Ok(());
    }

    let parsed: AssessResponse = match resp.json() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("verity-cli: failed to parse assess response: {}", e);
            std::process::exit(1);
        }
    };
    print!("{}", format_summary(&parsed));
    Ok(())
}

/// Show the server status by calling GET /health.
fn do_status(server: &str) -> anyhow::Result<()> {
    let client = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()?;

    let url = format!("{}/health", server);

    match client.get(&url).send() {
        Ok(r) if r.status().is_success() => {
            let body: serde_json::Value = r.json().unwrap_or_default();
            println!("Verity server: {}", body["status"].as_str().unwrap_or("unknown"));
            println!("Version:       {}", body["version"].as_str().unwrap_or("?"));
            println!("Classifier:    {}", body["classifier"].as_str().unwrap_or("?"));
            println!("Retriever:     {}", body["retriever"].as_str().unwrap_or("?"));
            println!("Neighbours k:  {}", body["k"]);
            if let Some(n) = body.get("reference_articles") {
                println!("References:    {}", n);
            }
        }
        Ok(r) => {
            eprintln!("verity-cli: server unhealthy (HTTP {})", r.status());
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("verity-cli: cannot reach {}: {}", url, e);
            std::process::exit(1);
        }
    }

    Ok(())
}

// ============================================================================
// Main
// ============================================================================

fn main() {
    let cli = Cli::parse();
    let server = cli.server.trim_end_matches('/').to_string();

    let result = match cli.command {
        Commands::Assess { text, json } => do_assess(&server, &text, json),
        Commands::Status => do_status(&server),
    };

    if let Err(e) = result {
        eprintln!("verity-cli: {}", e);
        std::process::exit(1);
    }
}

// ============================================================================
// Tests
// ============================================================================
