//! Configuration parsing and validation.
//!
//! A-RAG Bench is configured via a TOML file (default:
//! `./config/arag.toml`). Every section is optional; missing values fall
//! back to the defaults below. The OpenAI API key is never read from the
//! file: it comes from `OPENAI_API_KEY` (a `.env` file is honoured).
//!
//! # Example Configuration
//!
//! ```toml
//! [chunking]
//! chunk_size = 1000
//! chunk_overlap = 200
//!
//! [retrieval]
//! standard_top_k = 5
//! tool_top_k = 3
//!
//! [agent]
//! max_steps = 10
//! timeout_secs = 120
//!
//! [embedding]
//! provider = "openai"
//! model = "text-embedding-3-small"
//! dims = 1536
//!
//! [llm]
//! provider = "openai"
//! model = "gpt-4o-mini"
//! temperature = 0.0
//!
//! [server]
//! bind = "127.0.0.1:8080"
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

use arag_bench_core::session::SessionOptions;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Target chunk length in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Characters shared between neighbouring chunks.
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

fn default_chunk_size() -> usize {
    1000
}
fn default_chunk_overlap() -> usize {
    200
}

#[derive(Debug, Deserialize, Clone)]
pub struct RetrievalConfig {
    /// Chunks the standard pipeline puts in its context.
    #[serde(default = "default_standard_top_k")]
    pub standard_top_k: usize,
    /// Results per keyword/semantic tool call.
    #[serde(default = "default_tool_top_k")]
    pub tool_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            standard_top_k: default_standard_top_k(),
            tool_top_k: default_tool_top_k(),
        }
    }
}

fn default_standard_top_k() -> usize {
    5
}
fn default_tool_top_k() -> usize {
    3
}

#[derive(Debug, Deserialize, Clone)]
pub struct AgentConfig {
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,
    /// Wall-clock limit for one agent run.
    #[serde(default = "default_agent_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            timeout_secs: default_agent_timeout_secs(),
        }
    }
}

fn default_max_steps() -> usize {
    10
}
fn default_agent_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmbeddingConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub dims: Option<usize>,
    /// Base URL override (Ollama server or OpenAI-compatible endpoint).
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            dims: None,
            url: None,
            batch_size: default_batch_size(),
            max_retries: default_max_retries(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            url: None,
            temperature: 0.0,
            max_retries: default_max_retries(),
            timeout_secs: default_llm_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn is_enabled(&self) -> bool {
        self.provider != "disabled"
    }
}

fn default_provider() -> String {
    "disabled".to_string()
}
fn default_batch_size() -> usize {
    64
}
fn default_max_retries() -> u32 {
    5
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_llm_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

impl Config {
    /// All defaults; used by commands that can run without a config file.
    pub fn minimal() -> Self {
        Self::default()
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            chunk_size: self.chunking.chunk_size,
            chunk_overlap: self.chunking.chunk_overlap,
            embed_batch_size: self.embedding.batch_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            anyhow::bail!("chunking.chunk_size must be > 0");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            anyhow::bail!("chunking.chunk_overlap must be < chunking.chunk_size");
        }

        if self.retrieval.standard_top_k == 0 {
            anyhow::bail!("retrieval.standard_top_k must be >= 1");
        }
        if self.retrieval.tool_top_k == 0 {
            anyhow::bail!("retrieval.tool_top_k must be >= 1");
        }

        if self.agent.max_steps == 0 {
            anyhow::bail!("agent.max_steps must be >= 1");
        }
        if self.agent.timeout_secs == 0 {
            anyhow::bail!("agent.timeout_secs must be > 0");
        }

        match self.embedding.provider.as_str() {
            "disabled" | "hashing" => {}
            "openai" | "ollama" => {
                if self.embedding.model.is_none() {
                    anyhow::bail!(
                        "embedding.model must be specified when provider is '{}'",
                        self.embedding.provider
                    );
                }
            }
            other => anyhow::bail!(
                "Unknown embedding provider: '{}'. Must be disabled, openai, ollama, or hashing.",
                other
            ),
        }
        if self.embedding.is_enabled() && self.embedding.dims == Some(0) {
            anyhow::bail!("embedding.dims must be > 0");
        }
        if self.embedding.batch_size == 0 {
            anyhow::bail!("embedding.batch_size must be > 0");
        }

        match self.llm.provider.as_str() {
            "disabled" => {}
            "openai" | "ollama" => {
                if self.llm.model.is_none() {
                    anyhow::bail!(
                        "llm.model must be specified when provider is '{}'",
                        self.llm.provider
                    );
                }
            }
            other => anyhow::bail!(
                "Unknown llm provider: '{}'. Must be disabled, openai, or ollama.",
                other
            ),
        }

        Ok(())
    }
}

pub fn parse_config(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content).with_context(|| "Failed to parse config file")?;
    config.validate()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let cfg = parse_config("").unwrap();
        assert_eq!(cfg.chunking.chunk_size, 1000);
        assert_eq!(cfg.chunking.chunk_overlap, 200);
        assert_eq!(cfg.retrieval.standard_top_k, 5);
        assert_eq!(cfg.retrieval.tool_top_k, 3);
        assert_eq!(cfg.agent.max_steps, 10);
        assert_eq!(cfg.agent.timeout_secs, 120);
        assert!(!cfg.embedding.is_enabled());
        assert!(!cfg.llm.is_enabled());
        assert_eq!(cfg.server.bind, "127.0.0.1:8080");
    }

    #[test]
    fn test_full_config() {
        let cfg = parse_config(
            r#"
            [chunking]
            chunk_size = 500
            chunk_overlap = 50

            [agent]
            max_steps = 4

            [embedding]
            provider = "ollama"
            model = "nomic-embed-text"
            dims = 768
            url = "http://localhost:11434"

            [llm]
            provider = "openai"
            model = "gpt-4o-mini"
            temperature = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.chunking.chunk_size, 500);
        assert_eq!(cfg.agent.max_steps, 4);
        assert_eq!(cfg.embedding.provider, "ollama");
        assert_eq!(cfg.embedding.dims, Some(768));
        assert_eq!(cfg.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert!((cfg.llm.temperature - 0.2).abs() < 1e-6);

        let opts = cfg.session_options();
        assert_eq!(opts.chunk_size, 500);
        assert_eq!(opts.chunk_overlap, 50);
        assert_eq!(opts.embed_batch_size, 64);
    }

    #[test]
    fn test_rejects_zero_chunk_size() {
        let err = parse_config("[chunking]\nchunk_size = 0\nchunk_overlap = 0").unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        let err = parse_config("[chunking]\nchunk_size = 100\nchunk_overlap = 100").unwrap_err();
        assert!(err.to_string().contains("chunk_overlap"));
    }

    #[test]
    fn test_rejects_zero_max_steps() {
        let err = parse_config("[agent]\nmax_steps = 0").unwrap_err();
        assert!(err.to_string().contains("max_steps"));
        assert!(parse_config("[agent]\nmax_steps = 1").is_ok());
    }

    #[test]
    fn test_rejects_unknown_providers() {
        assert!(parse_config("[embedding]\nprovider = \"magic\"").is_err());
        assert!(parse_config("[llm]\nprovider = \"magic\"").is_err());
    }

    #[test]
    fn test_remote_providers_need_model() {
        assert!(parse_config("[embedding]\nprovider = \"openai\"").is_err());
        assert!(parse_config("[llm]\nprovider = \"ollama\"").is_err());
        assert!(parse_config("[embedding]\nprovider = \"hashing\"").is_ok());
    }

    #[test]
    fn test_load_config_missing_file() {
        let err = load_config(Path::new("/nonexistent/arag.toml")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_minimal_is_valid() {
        Config::minimal().validate().unwrap();
    }

    #[test]
    fn test_example_config_parses() {
        let cfg = parse_config(include_str!("../config/arag.example.toml")).unwrap();
        assert_eq!(cfg.embedding.provider, "openai");
        assert_eq!(cfg.llm.model.as_deref(), Some("gpt-4o-mini"));
        assert_eq!(cfg.retrieval.tool_top_k, 3);
    }
}
