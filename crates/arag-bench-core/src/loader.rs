//! Document loader trait.
//!
//! Turns a raw uploaded byte stream into extracted text. The PDF-backed
//! implementation lives in the `arag-bench` app crate.

use crate::error::{RagError, Result};

pub trait DocumentLoader: Send + Sync {
    /// Extract the full text of a document.
    ///
    /// Failures are reported as [`RagError::Load`].
    fn load(&self, bytes: &[u8]) -> Result<String>;
}

/// Loader for plain UTF-8 text.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextLoader;

impl DocumentLoader for TextLoader {
    fn load(&self, bytes: &[u8]) -> Result<String> {
        String::from_utf8(bytes.to_vec())
            .map_err(|e| RagError::Load(format!("input is not valid UTF-8: {}", e)))
    }
}
