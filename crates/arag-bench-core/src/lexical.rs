//! BM25 Okapi keyword index over the chunk sequence.
//!
//! Tokenization is deliberately simple: lowercase, then split on
//! whitespace. Punctuation stays attached to its word, so `total?` and
//! `total` are different terms.
//!
//! # Scoring
//!
//! ```text
//! idf(t)      = ln((N - n(t) + 0.5) / (n(t) + 0.5))
//! score(d, q) = Σ idf(t) · f(t,d)·(k1+1) / (f(t,d) + k1·(1 - b + b·|d|/avgdl))
//! ```
//!
//! Terms that occur in more than half the chunks get a negative IDF; those
//! are floored to `epsilon × average_idf` so common words still contribute
//! a small positive amount.

use std::collections::HashMap;

use crate::models::Chunk;

const K1: f64 = 1.5;
const B: f64 = 0.75;
const EPSILON: f64 = 0.25;

/// A chunk position and its BM25 score.
#[derive(Debug, Clone, PartialEq)]
pub struct LexicalHit {
    /// Index into the chunk sequence the index was built from.
    pub position: usize,
    pub score: f64,
}

/// Immutable BM25 structure. Rebuild to change the corpus.
#[derive(Debug, Default)]
pub struct LexicalIndex {
    term_freqs: Vec<HashMap<String, usize>>,
    doc_lens: Vec<usize>,
    avgdl: f64,
    idf: HashMap<String, f64>,
}

pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

impl LexicalIndex {
    pub fn build(chunks: &[Chunk]) -> Self {
        let mut term_freqs = Vec::with_capacity(chunks.len());
        let mut doc_lens = Vec::with_capacity(chunks.len());
        let mut doc_counts: HashMap<String, usize> = HashMap::new();

        for chunk in chunks {
            let tokens = tokenize(&chunk.text);
            doc_lens.push(tokens.len());
            let mut freqs: HashMap<String, usize> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_insert(0) += 1;
            }
            for term in freqs.keys() {
                *doc_counts.entry(term.clone()).or_insert(0) += 1;
            }
            term_freqs.push(freqs);
        }

        let n = chunks.len() as f64;
        let total_len: usize = doc_lens.iter().sum();
        let avgdl = if chunks.is_empty() {
            0.0
        } else {
            total_len as f64 / n
        };

        let mut idf = HashMap::with_capacity(doc_counts.len());
        let mut idf_sum = 0.0;
        let mut negative = Vec::new();
        for (term, count) in doc_counts {
            let count = count as f64;
            let value = ((n - count + 0.5) / (count + 0.5)).ln();
            idf_sum += value;
            if value < 0.0 {
                negative.push(term.clone());
            }
            idf.insert(term, value);
        }
        if !idf.is_empty() {
            let floor = EPSILON * idf_sum / idf.len() as f64;
            for term in negative {
                idf.insert(term, floor);
            }
        }

        Self {
            term_freqs,
            doc_lens,
            avgdl,
            idf,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_lens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_lens.is_empty()
    }

    /// BM25 score of every chunk against `query`, in chunk order.
    pub fn scores(&self, query: &str) -> Vec<f64> {
        let terms = tokenize(query);
        self.term_freqs
            .iter()
            .zip(self.doc_lens.iter())
            .map(|(freqs, &len)| {
                let norm = if self.avgdl > 0.0 {
                    K1 * (1.0 - B + B * len as f64 / self.avgdl)
                } else {
                    K1
                };
                terms
                    .iter()
                    .map(|t| {
                        let f = *freqs.get(t).unwrap_or(&0) as f64;
                        let idf = self.idf.get(t).copied().unwrap_or(0.0);
                        idf * (f * (K1 + 1.0)) / (f + norm)
                    })
                    .sum()
            })
            .collect()
    }

    /// Top `k` chunks, best first.
    ///
    /// Always returns `min(k, len)` hits, zero-scored ones included. Equal
    /// scores keep chunk order.
    pub fn query(&self, query: &str, k: usize) -> Vec<LexicalHit> {
        let mut hits: Vec<LexicalHit> = self
            .scores(query)
            .into_iter()
            .enumerate()
            .map(|(position, score)| LexicalHit { position, score })
            .collect();
        hits.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(k);
        hits
    }
}
