//! One document's chunk store and both indices, built in one go.
//!
//! A [`Session`] is immutable once built. Re-ingestion builds a new
//! session and the caller swaps it in; nothing is updated in place, so a
//! reader holding an `Arc<Session>` always sees a consistent chunk set.

use std::sync::Arc;

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::info;
use uuid::Uuid;

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::lexical::LexicalIndex;
use crate::models::{Chunk, Document};
use crate::semantic::SemanticIndex;
use crate::store::ChunkStore;

/// Chunking and embedding parameters used to build a session.
#[derive(Debug, Clone, Copy)]
pub struct SessionOptions {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub embed_batch_size: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            embed_batch_size: 64,
        }
    }
}

impl SessionOptions {
    /// Rejects settings the chunker and embedder cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::Config(
                "chunk_overlap must be < chunk_size".to_string(),
            ));
        }
        if self.embed_batch_size == 0 {
            return Err(RagError::Config("embed_batch_size must be > 0".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Session {
    document: Document,
    store: ChunkStore,
    lexical: LexicalIndex,
    semantic: SemanticIndex,
}

impl Session {
    /// Chunk `text` under a fresh document id and index it both ways.
    ///
    /// Fails with `Config` for unusable options, `EmptyDocument` for
    /// whitespace-only text and `Provider` when embedding fails.
    pub async fn build(
        text: &str,
        options: SessionOptions,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Result<Self> {
        options.validate()?;
        let document_id = Uuid::new_v4().to_string();

        let mut store = ChunkStore::new();
        store.load(
            &document_id,
            text,
            options.chunk_size,
            options.chunk_overlap,
        )?;

        let lexical = LexicalIndex::build(store.chunks());
        let semantic = SemanticIndex::build(
            &document_id,
            store.chunks(),
            embedder,
            options.embed_batch_size,
        )
        .await?;

        let document = Document {
            id: document_id,
            content_hash: format!("{:x}", Sha256::digest(text.as_bytes())),
            char_count: text.chars().count(),
            chunk_count: store.len(),
            ingested_at: Utc::now(),
        };

        info!(
            doc_id = %document.id,
            chunks = document.chunk_count,
            chars = document.char_count,
            collection = semantic.collection(),
            "session built"
        );

        Ok(Self {
            document,
            store,
            lexical,
            semantic,
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn semantic(&self) -> &SemanticIndex {
        &self.semantic
    }

    /// Chunk at a position reported by either index.
    pub fn chunk_at(&self, position: usize) -> Option<&Chunk> {
        self.store.chunks().get(position)
    }
}
