//! Latency, step, and token accounting for both pipelines.
//!
//! Everything here is pure aggregation: callers measure elapsed time and
//! collect the text they want counted, then build a [`Metrics`] value.

use std::time::Duration;

use serde::Serialize;

/// Per-answer metrics, serialized with the field names the comparison
/// output uses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metrics {
    /// Number of chunks the standard pipeline put in its context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retrieved_docs: Option<usize>,
    /// Standard pipeline: 1. Agent loop: number of recorded tool steps.
    pub steps: usize,
    /// Wall-clock seconds, rounded to two decimals.
    pub latency: f64,
    /// Approximate token count, see [`approx_tokens`].
    pub tokens: usize,
    /// Agent loop only: true when the step bound ended the loop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exhausted: Option<bool>,
}

impl Metrics {
    /// Metrics for a single retrieve-then-generate call.
    pub fn standard(retrieved_docs: usize, elapsed: Duration, counted: &[&str]) -> Self {
        Self {
            retrieved_docs: Some(retrieved_docs),
            steps: 1,
            latency: round2(elapsed.as_secs_f64()),
            tokens: counted.iter().map(|t| approx_tokens(t)).sum(),
            exhausted: None,
        }
    }

    /// Metrics for one agent loop run.
    pub fn agentic(steps: usize, elapsed: Duration, counted: &[&str], exhausted: bool) -> Self {
        Self {
            retrieved_docs: None,
            steps,
            latency: round2(elapsed.as_secs_f64()),
            tokens: counted.iter().map(|t| approx_tokens(t)).sum(),
            exhausted: Some(exhausted),
        }
    }
}

/// Whitespace-delimited word count.
///
/// An approximation for comparing the two pipelines, not a tokenizer and
/// not a billing figure.
pub fn approx_tokens(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
