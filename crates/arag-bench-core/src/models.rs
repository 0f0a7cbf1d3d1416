//! Core data models shared by the indices, pipelines, and engine.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::metrics::Metrics;
use crate::tools::ToolCall;

/// The single active document of a session.
///
/// The source bytes are consumed at ingestion time and not retained; only
/// the identity and a fingerprint of the extracted text survive.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Opaque UUID generated at ingestion time.
    pub id: String,
    /// SHA-256 hex digest of the extracted text.
    pub content_hash: String,
    /// Number of characters in the extracted text.
    pub char_count: usize,
    /// Number of chunks the text was split into.
    pub chunk_count: usize,
    pub ingested_at: DateTime<Utc>,
}

/// A bounded contiguous slice of a document's extracted text.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk {
    /// Chunk UUID, unique for the lifetime of the process.
    pub id: String,
    /// Back-reference to the owning [`Document`].
    pub document_id: String,
    /// Position in the chunk sequence, contiguous from 0.
    pub chunk_index: usize,
    /// Byte offset of the first character of `text` in the extracted text.
    pub start_offset: usize,
    pub text: String,
}

/// One tool invocation of the agent loop and what it observed.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub call: ToolCall,
    pub observation: String,
}

/// Answer and metrics from the standard pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineAnswer {
    pub answer: String,
    pub metrics: Metrics,
}

/// Answer, metrics, and tool trace from the agent loop.
#[derive(Debug, Clone, Serialize)]
pub struct AgentAnswer {
    pub answer: String,
    pub metrics: Metrics,
    pub trace: Vec<AgentStep>,
}

/// Side-by-side result of one comparison query.
#[derive(Debug, Clone, Serialize)]
pub struct ComparisonResult {
    pub standard: PipelineAnswer,
    pub agentic: AgentAnswer,
}
