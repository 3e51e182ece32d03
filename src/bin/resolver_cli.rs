// src/bin/resolver_cli.rs
//
// Local dev/demo harness for the resolver core, playing the role the
// teacher's tail/replay modes play for its detection engine: a way to
// drive the pipeline from a JSONL corpus on disk without a real HTTP or
// persistence boundary in front of it.
//
// Usage:
//   resolver-cli resolve --corpus corpus.jsonl --phone +15551234
//   resolver-cli build-stats --corpus corpus.jsonl --out stats.json
//   resolver-cli learn --registry registry.json --token zyrah --category first-name

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use identity_resolver::{
    build_global_token_stats, resolve, CrowdEntry, NameCategory, ResolverConfig, ResolverError,
    SharedRegistry, TokenStatsMap,
};

#[derive(Parser)]
#[command(
    name    = "resolver-cli",
    about   = "Crowdsourced caller-identity resolution — dev harness",
    version = env!("CARGO_PKG_VERSION"),
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve one phone number's entries from a JSONL corpus.
    Resolve {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        phone: String,
        #[arg(long, help = "Precomputed global token stats (JSON), optional")]
        stats: Option<PathBuf>,
        #[arg(long, help = "Corpus-wide distinct phone-number count")]
        total_numbers: Option<u64>,
    },
    /// Build and persist global token statistics over an entire corpus.
    BuildStats {
        #[arg(long)]
        corpus: PathBuf,
        #[arg(long)]
        out: PathBuf,
    },
    /// Teach the in-process registry a new token (prints the updated counts).
    Learn {
        #[arg(long)]
        token: String,
        #[arg(long, value_enum)]
        category: CliCategory,
    },
}

#[derive(Clone, ValueEnum)]
enum CliCategory {
    FirstName,
    LastName,
    MiddleName,
    Prefix,
    Relationship,
    Descriptor,
}

impl From<CliCategory> for NameCategory {
    fn from(c: CliCategory) -> Self {
        match c {
            CliCategory::FirstName => NameCategory::FirstName,
            CliCategory::LastName => NameCategory::LastName,
            CliCategory::MiddleName => NameCategory::MiddleName,
            CliCategory::Prefix => NameCategory::Prefix,
            CliCategory::Relationship => NameCategory::Relationship,
            CliCategory::Descriptor => NameCategory::Descriptor,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CorpusRow {
    phone: String,
    saved_name: String,
    user_id: String,
    #[serde(default)]
    timestamp: i64,
    #[serde(default = "default_country")]
    country: String,
    #[serde(default = "default_trust")]
    trust_score: f32,
}

fn default_country() -> String {
    "UNKNOWN".to_string()
}

fn default_trust() -> f32 {
    0.5
}

async fn load_corpus(path: &PathBuf) -> Result<Vec<CorpusRow>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading corpus file {}", path.display()))?;

    let mut rows = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<CorpusRow>(line) {
            Ok(row) => rows.push(row),
            Err(source) => {
                let err = ResolverError::MalformedEntry { line: idx + 1, source };
                warn!("skipping corpus line: {err}");
            }
        }
    }
    Ok(rows)
}

fn group_by_phone(rows: Vec<CorpusRow>) -> HashMap<String, Vec<CrowdEntry>> {
    let mut grouped: HashMap<String, Vec<CrowdEntry>> = HashMap::new();
    for row in rows {
        grouped.entry(row.phone).or_default().push(CrowdEntry {
            saved_name: row.saved_name,
            user_id: row.user_id,
            timestamp: row.timestamp,
            country: row.country,
            trust_score: row.trust_score,
        });
    }
    grouped
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("resolver_cli=info".parse()?),
        )
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Resolve {
            corpus,
            phone,
            stats,
            total_numbers,
        } => {
            let rows = load_corpus(&corpus).await?;
            let grouped = group_by_phone(rows);
            let total_numbers = total_numbers.unwrap_or(grouped.len() as u64);
            let entries = grouped.get(&phone).cloned().unwrap_or_default();
            if entries.is_empty() {
                warn!("no entries found for {}", phone);
            }

            let token_stats: TokenStatsMap = match stats {
                Some(path) => {
                    let content = tokio::fs::read_to_string(&path).await?;
                    serde_json::from_str(&content).map_err(|e| {
                        ResolverError::InvalidSnapshot(format!("{}: {e}", path.display()))
                    })?
                }
                None => TokenStatsMap::new(),
            };

            let registry = SharedRegistry::new();
            let snapshot = registry.snapshot();
            let config = ResolverConfig::default();

            let profile = resolve(&entries, total_numbers, &token_stats, &snapshot, &config);
            println!("{}", serde_json::to_string_pretty(&profile)?);
        }

        Command::BuildStats { corpus, out } => {
            let rows = load_corpus(&corpus).await?;
            let grouped = group_by_phone(rows);

            let mut all_cleaned = Vec::new();
            for (phone, entries) in &grouped {
                for entry in entries {
                    if let Some(cleaned) =
                        identity_resolver::pipeline::tokenizer::normalize_entry(entry)
                    {
                        all_cleaned.push((phone.clone(), cleaned));
                    }
                }
            }

            let stats = build_global_token_stats(&all_cleaned);
            info!("built stats for {} unique tokens", stats.len());
            tokio::fs::write(&out, serde_json::to_string_pretty(&stats)?).await?;
        }

        Command::Learn { token, category } => {
            let registry = SharedRegistry::new();
            let config = ResolverConfig::default();
            let added = registry.learn_token(&token, category.into(), config.min_learn_token_len);
            let counts = registry.snapshot().get_counts();
            println!("learned={added}");
            for (category, count) in counts {
                println!("{category:?}: {count}");
            }
        }
    }

    Ok(())
}
