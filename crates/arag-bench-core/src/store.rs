//! Ordered chunk storage with lookup by chunk id.
//!
//! A [`ChunkStore`] holds the chunk sequence of exactly one document. The
//! sequence is kept in split order (the order both indices rank ties by)
//! and an id map gives constant-time resolution for `read_chunk`.

use std::collections::HashMap;

use crate::chunk::chunk_text;
use crate::error::{RagError, Result};
use crate::models::Chunk;

/// In-memory chunk sequence for the active document.
#[derive(Debug, Default)]
pub struct ChunkStore {
    chunks: Vec<Chunk>,
    by_id: HashMap<String, usize>,
}

impl ChunkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Split `text` and replace every previously held chunk with the result.
    ///
    /// Fails with [`RagError::EmptyDocument`] when the text has no
    /// non-whitespace characters; the store is left untouched in that case.
    pub fn load(
        &mut self,
        document_id: &str,
        text: &str,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<&[Chunk]> {
        let chunks = chunk_text(document_id, text, chunk_size, chunk_overlap);
        if chunks.is_empty() {
            return Err(RagError::EmptyDocument);
        }

        self.by_id = chunks
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();
        self.chunks = chunks;
        Ok(&self.chunks)
    }

    pub fn get(&self, chunk_id: &str) -> Result<&Chunk> {
        self.by_id
            .get(chunk_id)
            .map(|&i| &self.chunks[i])
            .ok_or_else(|| RagError::ChunkNotFound(chunk_id.to_string()))
    }

    /// Chunks in split order.
    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
