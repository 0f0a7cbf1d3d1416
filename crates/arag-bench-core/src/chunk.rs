//! Recursive character text splitter with overlap.
//!
//! Splits extracted document text into [`Chunk`]s of at most `chunk_size`
//! characters, where consecutive chunks share up to `chunk_overlap`
//! characters. Every chunk records the byte offset of its first character
//! in the source text, so results can always be related back to their
//! position in the document.
//!
//! # Algorithm
//!
//! 1. Try separators in order: `"\n\n"`, `"\n"`, `" "`, then single
//!    characters. The first separator present in an oversized span splits
//!    it; each separator stays attached to the start of the piece after it.
//! 2. Pieces still longer than `chunk_size` are split again with the
//!    remaining separators.
//! 3. Pieces are merged left to right into a window. When the next piece
//!    would overflow the window, the window is emitted as a chunk and
//!    pieces are dropped from its front until at most `chunk_overlap`
//!    characters remain (and the next piece fits).
//! 4. Chunk text is trimmed; `start_offset` points at the first
//!    non-whitespace byte.
//!
//! Pieces are contiguous spans of the source, so every non-whitespace byte
//! of the input ends up in at least one chunk and start offsets never
//! decrease.
//!
//! # Example
//!
//! ```rust
//! use arag_bench_core::chunk::chunk_text;
//!
//! let chunks = chunk_text("doc-123", "Hello world.\n\nSecond paragraph.", 1000, 200);
//! assert_eq!(chunks.len(), 1);
//! assert_eq!(chunks[0].start_offset, 0);
//! ```

use std::collections::VecDeque;
use std::ops::Range;

use uuid::Uuid;

use crate::models::Chunk;

/// Separators tried in order; the empty string means "split per character".
const SEPARATORS: &[&str] = &["\n\n", "\n", " ", ""];

/// A contiguous byte span of the source text and its length in characters.
struct Piece {
    range: Range<usize>,
    chars: usize,
}

/// Split `text` into overlapping chunks stamped with `document_id`.
///
/// Returns an empty vector when `text` has no non-whitespace characters or
/// `chunk_size` is zero. Chunk indices are contiguous from 0 and every
/// chunk receives a fresh UUID.
pub fn chunk_text(
    document_id: &str,
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    if chunk_size == 0 || text.trim().is_empty() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    split_recursive(text, 0..text.len(), SEPARATORS, chunk_size, &mut pieces);
    merge_pieces(document_id, text, &pieces, chunk_size, chunk_overlap)
}

fn split_recursive(
    text: &str,
    range: Range<usize>,
    separators: &[&str],
    chunk_size: usize,
    out: &mut Vec<Piece>,
) {
    let slice = &text[range.clone()];
    let chars = slice.chars().count();
    if chars <= chunk_size {
        out.push(Piece { range, chars });
        return;
    }

    let (separator, rest) = match separators
        .iter()
        .position(|s| s.is_empty() || slice.contains(s))
    {
        Some(i) => (separators[i], &separators[i + 1..]),
        None => ("", &[][..]),
    };

    if separator.is_empty() {
        for (i, c) in slice.char_indices() {
            let start = range.start + i;
            out.push(Piece {
                range: start..start + c.len_utf8(),
                chars: 1,
            });
        }
        return;
    }

    for part in split_keep_separator(slice, separator) {
        let abs = range.start + part.start..range.start + part.end;
        split_recursive(text, abs, rest, chunk_size, out);
    }
}

/// Split on `separator`, keeping each occurrence at the start of the
/// following part. Returned ranges are relative to `slice` and non-empty.
fn split_keep_separator(slice: &str, separator: &str) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut start = 0;
    for (idx, _) in slice.match_indices(separator) {
        if idx > start {
            parts.push(start..idx);
            start = idx;
        }
    }
    parts.push(start..slice.len());
    parts
}

fn merge_pieces(
    document_id: &str,
    text: &str,
    pieces: &[Piece],
    chunk_size: usize,
    chunk_overlap: usize,
) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut window: VecDeque<&Piece> = VecDeque::new();
    let mut window_chars = 0usize;

    for piece in pieces {
        if !window.is_empty() && window_chars + piece.chars > chunk_size {
            push_chunk(&mut chunks, document_id, text, window_span(&window));

            while let Some(front) = window.front() {
                if window_chars > chunk_overlap || window_chars + piece.chars > chunk_size {
                    window_chars -= front.chars;
                    window.pop_front();
                } else {
                    break;
                }
            }
        }
        window_chars += piece.chars;
        window.push_back(piece);
    }

    if !window.is_empty() {
        push_chunk(&mut chunks, document_id, text, window_span(&window));
    }

    chunks
}

fn window_span(window: &VecDeque<&Piece>) -> Range<usize> {
    match (window.front(), window.back()) {
        (Some(first), Some(last)) => first.range.start..last.range.end,
        _ => 0..0,
    }
}

/// Trim the span and append it as a chunk, skipping whitespace-only spans.
fn push_chunk(chunks: &mut Vec<Chunk>, document_id: &str, text: &str, span: Range<usize>) {
    let slice = &text[span.clone()];
    let trimmed = slice.trim();
    if trimmed.is_empty() {
        return;
    }
    let leading = slice.len() - slice.trim_start().len();

    chunks.push(Chunk {
        id: Uuid::new_v4().to_string(),
        document_id: document_id.to_string(),
        chunk_index: chunks.len(),
        start_offset: span.start + leading,
        text: trimmed.to_string(),
    });
}
