//! Embedding nearest-neighbour index over the chunk sequence.
//!
//! Each build creates a fresh collection named `collection_<document_id>`;
//! collections are never reused across ingestions. Vectors are held in
//! chunk order and searched brute-force by cosine similarity, which is
//! plenty for a single document.

use std::sync::Arc;

use tracing::debug;

use crate::embedding::{cosine_similarity, embed_query, EmbeddingProvider};
use crate::error::{RagError, Result};
use crate::models::Chunk;

/// A chunk position and its cosine similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticHit {
    pub position: usize,
    pub score: f32,
}

pub struct SemanticIndex {
    collection: String,
    vectors: Vec<Vec<f32>>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl std::fmt::Debug for SemanticIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticIndex")
            .field("collection", &self.collection)
            .field("vectors", &self.vectors.len())
            .field("model", &self.provider.model_name())
            .finish()
    }
}

pub fn collection_name(document_id: &str) -> String {
    format!("collection_{}", document_id)
}

impl SemanticIndex {
    /// Embed every chunk, `batch_size` texts per provider request.
    pub async fn build(
        document_id: &str,
        chunks: &[Chunk],
        provider: Arc<dyn EmbeddingProvider>,
        batch_size: usize,
    ) -> Result<Self> {
        let batch_size = batch_size.max(1);
        let mut vectors = Vec::with_capacity(chunks.len());

        for batch in chunks.chunks(batch_size) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = provider.embed(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(RagError::Provider(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }

        let collection = collection_name(document_id);
        debug!(
            collection = %collection,
            vectors = vectors.len(),
            model = provider.model_name(),
            "semantic index built"
        );

        Ok(Self {
            collection,
            vectors,
            provider,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Top `k` chunks by descending cosine similarity. Ties keep chunk order.
    pub async fn query(&self, text: &str, k: usize) -> Result<Vec<SemanticHit>> {
        let query_vec = embed_query(self.provider.as_ref(), text).await?;
        let mut hits: Vec<SemanticHit> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, v)| SemanticHit {
                position,
                score: cosine_similarity(&query_vec, v),
            })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        Ok(hits)
    }
}
