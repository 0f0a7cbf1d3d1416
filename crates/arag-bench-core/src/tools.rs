//! The retrieval tool set available to the agent loop.
//!
//! Tools form a closed set: [`ToolCall`] is the typed invocation and
//! [`RetrievalTools::invoke`] dispatches it against one session. These are
//! the only operations the agent can perform on the document.
//!
//! On the wire a call is a JSON object tagged by `tool`:
//!
//! ```json
//! {"tool": "keyword_search", "query": "total amount"}
//! {"tool": "semantic_search", "query": "what does the invoice sum to"}
//! {"tool": "read_chunk", "chunk_id": "5f0c..."}
//! ```

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RagError, Result};
use crate::models::Chunk;
use crate::session::Session;

/// Observation returned by `read_chunk` for an unknown chunk id.
pub const NOT_FOUND: &str = "not found";

/// A single tool invocation with its typed argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tool", rename_all = "snake_case")]
pub enum ToolCall {
    /// Exact-term search over the BM25 index.
    KeywordSearch { query: String },
    /// Meaning-based search over the embedding index.
    SemanticSearch { query: String },
    /// Full text of one chunk.
    ReadChunk { chunk_id: String },
}

impl ToolCall {
    pub fn name(&self) -> &'static str {
        match self {
            ToolCall::KeywordSearch { .. } => "keyword_search",
            ToolCall::SemanticSearch { .. } => "semantic_search",
            ToolCall::ReadChunk { .. } => "read_chunk",
        }
    }

    /// The argument value, for logging and token accounting.
    pub fn argument(&self) -> &str {
        match self {
            ToolCall::KeywordSearch { query } | ToolCall::SemanticSearch { query } => query,
            ToolCall::ReadChunk { chunk_id } => chunk_id,
        }
    }
}

impl fmt::Display for ToolCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", self.name(), self.argument())
    }
}

/// Render search hits as `[ChunkID: <id>] <text>` joined by blank lines.
pub fn render_hits<'a>(chunks: impl IntoIterator<Item = &'a Chunk>) -> String {
    chunks
        .into_iter()
        .map(|c| format!("[ChunkID: {}] {}", c.id, c.text))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Tool set bound to one session's indices.
#[derive(Debug, Clone)]
pub struct RetrievalTools {
    session: Arc<Session>,
    top_k: usize,
}

impl RetrievalTools {
    pub fn new(session: Arc<Session>, top_k: usize) -> Self {
        Self { session, top_k }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Top chunks for `query` from the BM25 index.
    pub fn keyword_search(&self, query: &str) -> Vec<&Chunk> {
        self.session
            .lexical()
            .query(query, self.top_k)
            .into_iter()
            .filter_map(|hit| self.session.chunk_at(hit.position))
            .collect()
    }

    /// Top chunks for `query` from the embedding index.
    pub async fn semantic_search(&self, query: &str) -> Result<Vec<&Chunk>> {
        let hits = self.session.semantic().query(query, self.top_k).await?;
        Ok(hits
            .into_iter()
            .filter_map(|hit| self.session.chunk_at(hit.position))
            .collect())
    }

    pub fn read_chunk(&self, chunk_id: &str) -> Result<&Chunk> {
        self.session.store().get(chunk_id)
    }

    /// Run one tool and return its observation text.
    ///
    /// An unknown chunk id yields the observation [`NOT_FOUND`] rather than
    /// an error; only provider failures are returned as `Err`.
    pub async fn invoke(&self, call: &ToolCall) -> Result<String> {
        let observation = match call {
            ToolCall::KeywordSearch { query } => render_hits(self.keyword_search(query)),
            ToolCall::SemanticSearch { query } => render_hits(self.semantic_search(query).await?),
            ToolCall::ReadChunk { chunk_id } => match self.read_chunk(chunk_id) {
                Ok(chunk) => chunk.text.clone(),
                Err(RagError::ChunkNotFound(_)) => NOT_FOUND.to_string(),
                Err(e) => return Err(e),
            },
        };
        debug!(
            tool = call.name(),
            arg = call.argument(),
            chars = observation.len(),
            "tool invoked"
        );
        Ok(observation)
    }
}
