//! Error kinds surfaced by the retrieval and agent core.
//!
//! Every fallible core operation returns [`RagError`]. Only
//! [`RagError::ChunkNotFound`] is soft: the tool set turns it into an
//! observation string and the agent loop recovers from it on its own.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RagError {
    /// The loaded document produced no extractable text.
    #[error("document contains no extractable text")]
    EmptyDocument,

    /// The standard pipeline was queried before any successful ingestion.
    #[error("index not ready: upload a document first")]
    IndexNotReady,

    /// A comparison was requested before any successful ingestion.
    #[error("no document indexed: upload a document first")]
    NoDocumentIndexed,

    /// The agent loop was invoked without a bound tool set.
    #[error("agent not initialized: upload a document first")]
    AgentNotInitialized,

    #[error("chunk not found: {0}")]
    ChunkNotFound(String),

    /// The document loader could not extract text from the input bytes.
    #[error("document load failed: {0}")]
    Load(String),

    /// An embedding or generation provider failed.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("invalid agent state transition from {from} via {event}")]
    InvalidTransition { from: String, event: String },

    #[error("operation timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("configuration error: {0}")]
    Config(String),
}

impl RagError {
    /// Short machine-readable code, used in HTTP error bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            RagError::EmptyDocument => "empty_document",
            RagError::IndexNotReady => "index_not_ready",
            RagError::NoDocumentIndexed => "no_document_indexed",
            RagError::AgentNotInitialized => "agent_not_initialized",
            RagError::ChunkNotFound(_) => "chunk_not_found",
            RagError::Load(_) => "load_error",
            RagError::Provider(_) => "provider_error",
            RagError::InvalidTransition { .. } => "internal",
            RagError::Timeout { .. } => "timeout",
            RagError::Config(_) => "config_error",
        }
    }
}

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, RagError>;
