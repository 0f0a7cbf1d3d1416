//! # A-RAG Bench Core
//!
//! Provider-agnostic retrieval and agent logic for A-RAG Bench: chunking,
//! the chunk store, BM25 and semantic indices, the retrieval tool set, the
//! standard pipeline, the bounded agent loop, and metrics.
//!
//! This crate contains no tokio runtime, HTTP client, or PDF parsing.
//! External collaborators (document loaders, embedding and generation
//! providers) are reached only through the traits in [`loader`],
//! [`embedding`], and [`llm`].
//!
//! ## Data Flow
//!
//! ```text
//! bytes ─▶ DocumentLoader ─▶ chunk ─▶ ChunkStore ─┬─▶ LexicalIndex ─┐
//!                                                 └─▶ SemanticIndex ┤
//!                                                                   ▼
//!                                   RetrievalTools ◀─── Session ───▶ StandardPipeline
//!                                         │
//!                                         ▼
//!                                     AgentLoop
//! ```

pub mod agent;
pub mod chunk;
pub mod embedding;
pub mod error;
pub mod lexical;
pub mod llm;
pub mod loader;
pub mod metrics;
pub mod models;
pub mod semantic;
pub mod session;
pub mod standard;
pub mod store;
pub mod tools;

pub use error::{RagError, Result};
