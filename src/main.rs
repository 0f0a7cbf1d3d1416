//! # A-RAG Bench CLI (`arag`)
//!
//! ## Usage
//!
//! ```bash
//! arag --config ./config/arag.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `arag serve` | Start the HTTP API |
//! | `arag chunks <file>` | Show how a document would be chunked |
//! | `arag ask <file> "<query>"` | Ingest a document and compare both pipelines |
//!
//! When the config file does not exist the built-in defaults are used.

use std::path::{Path, PathBuf};

use anyhow::Context;
use arag_bench::config::{load_config, Config};
use arag_bench::engine::Engine;
use arag_bench::extract::PdfLoader;
use arag_bench::{logger, server};
use arag_bench_core::chunk::chunk_text;
use arag_bench_core::loader::DocumentLoader;
use clap::{Parser, Subcommand};

/// A-RAG Bench: standard RAG versus agentic RAG over a single document.
#[derive(Parser)]
#[command(name = "arag", version)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/arag.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server on `[server].bind`.
    Serve,

    /// Chunk a document and print the result without calling any provider.
    Chunks {
        /// PDF or UTF-8 text file.
        file: PathBuf,
    },

    /// Ingest a document, answer a question with both pipelines and print JSON.
    Ask {
        /// PDF or UTF-8 text file.
        file: PathBuf,
        /// The question.
        query: String,
    },
}

fn resolve_config(path: &Path) -> anyhow::Result<Config> {
    if path.exists() {
        load_config(path)
    } else {
        tracing::debug!(path = %path.display(), "config not found; using defaults");
        Ok(Config::minimal())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logger::init(logger::DEFAULT_DIRECTIVE)?;

    let cli = Cli::parse();
    let cfg = resolve_config(&cli.config)?;

    match cli.command {
        Commands::Serve => {
            server::run_server(&cfg).await?;
        }
        Commands::Chunks { file } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let text = PdfLoader.load(&bytes)?;
            let chunks = chunk_text(
                "dry-run",
                &text,
                cfg.chunking.chunk_size,
                cfg.chunking.chunk_overlap,
            );
            println!("{} chars, {} chunks", text.chars().count(), chunks.len());
            for chunk in &chunks {
                println!(
                    "  #{:<4} offset {:>8}  len {:>6}",
                    chunk.chunk_index,
                    chunk.start_offset,
                    chunk.text.len()
                );
            }
        }
        Commands::Ask { file, query } => {
            let bytes = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let engine = Engine::from_config(&cfg)?;
            let report = engine.ingest(&bytes).await?;
            let result = engine.compare(&query, Some(&report.document_id)).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}
