//! The benchmark engine: one active document, two answering pipelines.
//!
//! The engine owns the current session behind a single-writer/multi-reader
//! lock. Ingestion builds a complete new session (chunks, both indices,
//! the standard pipeline and the agent loop) without holding the lock and
//! then swaps it in, so queries see either the old document or the new one,
//! never a mix. Queries clone the `Arc` snapshot and release the lock
//! before doing any provider I/O.
//!
//! # Readiness Errors
//!
//! | Call | Before first ingest |
//! |------|---------------------|
//! | [`Engine::standard`] | `IndexNotReady` |
//! | [`Engine::agentic`] | `AgentNotInitialized` |
//! | [`Engine::compare`] | `NoDocumentIndexed` |

use std::sync::Arc;
use std::time::Duration;

use arag_bench_core::agent::AgentLoop;
use arag_bench_core::embedding::EmbeddingProvider;
use arag_bench_core::llm::GenerationProvider;
use arag_bench_core::loader::DocumentLoader;
use arag_bench_core::models::{AgentAnswer, ComparisonResult, Document, PipelineAnswer};
use arag_bench_core::session::{Session, SessionOptions};
use arag_bench_core::standard::StandardPipeline;
use arag_bench_core::tools::RetrievalTools;
use arag_bench_core::{RagError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::embedding::create_provider;
use crate::extract::PdfLoader;
use crate::llm::create_generator;

/// Tunables taken from `[chunking]`, `[retrieval]`, `[agent]` and
/// `[embedding].batch_size`.
#[derive(Debug, Clone, Copy)]
pub struct EngineOptions {
    pub session: SessionOptions,
    pub standard_top_k: usize,
    pub tool_top_k: usize,
    pub max_steps: usize,
    pub agent_timeout: Duration,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self::from_config(&Config::minimal())
    }
}

impl EngineOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            session: config.session_options(),
            standard_top_k: config.retrieval.standard_top_k,
            tool_top_k: config.retrieval.tool_top_k,
            max_steps: config.agent.max_steps,
            agent_timeout: Duration::from_secs(config.agent.timeout_secs),
        }
    }
}

/// Summary returned by a successful ingestion.
#[derive(Debug, Clone, Serialize)]
pub struct IngestReport {
    pub document_id: String,
    pub chunks: usize,
    pub chars: usize,
    pub content_hash: String,
    pub ingested_at: DateTime<Utc>,
}

impl From<&Document> for IngestReport {
    fn from(doc: &Document) -> Self {
        Self {
            document_id: doc.id.clone(),
            chunks: doc.chunk_count,
            chars: doc.char_count,
            content_hash: doc.content_hash.clone(),
            ingested_at: doc.ingested_at,
        }
    }
}

/// Everything bound to one ingested document.
pub struct ActiveSession {
    pub session: Arc<Session>,
    pub standard: StandardPipeline,
    pub agent: AgentLoop,
}

pub struct Engine {
    loader: Arc<dyn DocumentLoader>,
    embedder: Arc<dyn EmbeddingProvider>,
    generator: Arc<dyn GenerationProvider>,
    options: EngineOptions,
    active: RwLock<Option<Arc<ActiveSession>>>,
}

impl Engine {
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        embedder: Arc<dyn EmbeddingProvider>,
        generator: Arc<dyn GenerationProvider>,
        options: EngineOptions,
    ) -> Self {
        Self {
            loader,
            embedder,
            generator,
            options,
            active: RwLock::new(None),
        }
    }

    /// Engine with the PDF loader and the providers named in `config`.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder = create_provider(&config.embedding)?;
        let generator = create_generator(&config.llm)?;
        info!(
            embedding = embedder.model_name(),
            llm = generator.model_name(),
            "engine providers ready"
        );
        Ok(Self::new(
            Arc::new(PdfLoader),
            embedder,
            generator,
            EngineOptions::from_config(config),
        ))
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Extract, chunk and index `bytes`, then make it the active document.
    ///
    /// On any error the previously active document stays in place.
    pub async fn ingest(&self, bytes: &[u8]) -> Result<IngestReport> {
        let loader = self.loader.clone();
        let owned = bytes.to_vec();
        let text = tokio::task::spawn_blocking(move || loader.load(&owned))
            .await
            .map_err(|e| RagError::Load(format!("loader task failed: {}", e)))??;

        let session =
            Arc::new(Session::build(&text, self.options.session, self.embedder.clone()).await?);

        let standard = StandardPipeline::new(
            session.clone(),
            self.generator.clone(),
            self.options.standard_top_k,
        );
        let agent = AgentLoop::new(
            RetrievalTools::new(session.clone(), self.options.tool_top_k),
            self.generator.clone(),
            self.options.max_steps,
        );
        let report = IngestReport::from(session.document());

        let previous = self.active.write().await.replace(Arc::new(ActiveSession {
            session,
            standard,
            agent,
        }));

        info!(
            doc_id = %report.document_id,
            chunks = report.chunks,
            replaced = previous.as_ref().map(|p| p.session.document().id.as_str()),
            "document indexed"
        );
        Ok(report)
    }

    /// Read snapshot of the active session.
    pub async fn snapshot(&self) -> Option<Arc<ActiveSession>> {
        self.active.read().await.clone()
    }

    pub async fn current_document(&self) -> Option<Document> {
        self.snapshot()
            .await
            .map(|a| a.session.document().clone())
    }

    pub async fn standard(&self, query: &str) -> Result<PipelineAnswer> {
        let active = self.snapshot().await.ok_or(RagError::IndexNotReady)?;
        active.standard.answer(query).await
    }

    pub async fn agentic(&self, query: &str) -> Result<AgentAnswer> {
        let active = self.snapshot().await.ok_or(RagError::AgentNotInitialized)?;
        self.run_agent(&active, query).await
    }

    /// Answer `query` with both pipelines concurrently.
    ///
    /// A `document_id` that does not match the active document is logged
    /// and otherwise ignored; the query runs against the active document.
    pub async fn compare(
        &self,
        query: &str,
        document_id: Option<&str>,
    ) -> Result<ComparisonResult> {
        let active = self.snapshot().await.ok_or(RagError::NoDocumentIndexed)?;

        let active_id = active.session.document().id.as_str();
        if let Some(requested) = document_id {
            if requested != active_id {
                warn!(
                    requested,
                    active = active_id,
                    "compare requested a stale document id; using the active document"
                );
            }
        }

        let (standard, agentic) =
            tokio::join!(active.standard.answer(query), self.run_agent(&active, query));

        Ok(ComparisonResult {
            standard: standard?,
            agentic: agentic?,
        })
    }

    async fn run_agent(&self, active: &ActiveSession, query: &str) -> Result<AgentAnswer> {
        let limit = self.options.agent_timeout;
        tokio::time::timeout(limit, active.agent.run(query))
            .await
            .map_err(|_| {
                warn!(secs = limit.as_secs(), "agent run timed out");
                RagError::Timeout {
                    secs: limit.as_secs(),
                }
            })?
    }
}
