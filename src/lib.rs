//! # A-RAG Bench
//!
//! Answers one question about one document two ways and reports both:
//! a **standard** single-shot RAG pipeline and an **agentic** loop that
//! picks among keyword search, semantic search and chunk reads before
//! answering.
//!
//! ```text
//!  upload ──▶ extract ──▶ chunk ──▶ BM25 + vectors ──▶ active session
//!                                                         │
//!                                   ┌─────────────────────┤
//!                                   ▼                     ▼
//!                              ┌──────────┐         ┌───────────┐
//!                              │ standard │         │ agent loop│
//!                              └────┬─────┘         └─────┬─────┘
//!                                   └──── comparison ◀────┘
//! ```
//!
//! The retrieval and reasoning logic lives in `arag-bench-core`; this crate
//! adds configuration, concrete HTTP providers, PDF extraction, the engine
//! that owns the active document, and the HTTP API.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`engine`] | Active document and pipeline orchestration |
//! | [`embedding`] | Embedding provider backends |
//! | [`llm`] | Chat generation backends |
//! | [`extract`] | PDF and text extraction |
//! | [`http`] | Shared HTTP retry policy |
//! | [`server`] | axum HTTP API |
//! | [`logger`] | tracing setup |

pub mod config;
pub mod embedding;
pub mod engine;
pub mod extract;
pub mod http;
pub mod llm;
pub mod logger;
pub mod server;
