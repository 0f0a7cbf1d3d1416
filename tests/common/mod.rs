//! Offline providers and fixtures shared by the integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use arag_bench::engine::{Engine, EngineOptions};
use arag_bench::extract::PdfLoader;
use arag_bench_core::embedding::HashingEmbedder;
use arag_bench_core::llm::{GenerationProvider, Message, Role};
use arag_bench_core::Result;
use async_trait::async_trait;
use tokio::sync::Notify;

pub const STANDARD_REPLY: &str = "The total is 42 dollars.";
pub const AGENT_REPLY: &str = "The invoice total is 42 dollars.";

/// Three "pages" of an invoice, separated the way extracted PDF pages are.
pub fn three_page_invoice() -> String {
    let page1 = "ACME Supplies Invoice 2024-117\n\nBill to: Northwind Traders, 12 Harbour Road.\n\
        Payment terms are net thirty days from the invoice date.";
    let page2 = "Line items\n\nWidget A, quantity 1, costs 10 dollars.\n\n\
        Widget B, quantity 2, costs 16 dollars each.";
    let page3 = "Summary\n\nThe invoice total is 42 dollars.\n\n\
        Please reference the invoice number when paying.";
    format!("{}\n\n\u{c}{}\n\n\u{c}{}", page1, page2, page3)
}

fn is_agent(messages: &[Message]) -> bool {
    messages
        .first()
        .map(|m| m.role == Role::System && m.content.contains("TOOL_CALL"))
        .unwrap_or(false)
}

fn assistant_turns(messages: &[Message]) -> usize {
    messages.iter().filter(|m| m.role == Role::Assistant).count()
}

/// Every `[ChunkID: <id>]` marker in a search observation, in order.
pub fn chunk_ids_in(observation: &str) -> Vec<String> {
    const MARKER: &str = "[ChunkID: ";
    let mut ids = Vec::new();
    let mut rest = observation;
    while let Some(found) = rest.find(MARKER) {
        rest = &rest[found + MARKER.len()..];
        match rest.find(']') {
            Some(end) => {
                ids.push(rest[..end].to_string());
                rest = &rest[end..];
            }
            None => break,
        }
    }
    ids
}

fn first_chunk_id(observation: &str) -> Option<String> {
    chunk_ids_in(observation).into_iter().next()
}

/// Answers the standard pipeline directly and drives the agent through
/// keyword search, a chunk read and a final answer.
pub struct BenchGenerator;

#[async_trait]
impl GenerationProvider for BenchGenerator {
    fn model_name(&self) -> &str {
        "bench"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        if !is_agent(messages) {
            return Ok(STANDARD_REPLY.to_string());
        }
        let reply = match assistant_turns(messages) {
            0 => "THOUGHT: I should find where the total is stated.\n\
                  TOOL_CALL: {\"tool\": \"keyword_search\", \"query\": \"total\"}"
                .to_string(),
            1 => {
                let last = messages.last().map(|m| m.content.as_str()).unwrap_or("");
                match first_chunk_id(last) {
                    Some(id) => format!(
                        "THOUGHT: The first hit looks relevant.\nTOOL_CALL: {{\"tool\": \"read_chunk\", \"chunk_id\": \"{}\"}}",
                        id
                    ),
                    None => format!("FINAL_ANSWER: {}", AGENT_REPLY),
                }
            }
            _ => format!("THOUGHT: Confirmed.\nFINAL_ANSWER: {}", AGENT_REPLY),
        };
        Ok(reply)
    }
}

/// [`BenchGenerator`] whose first agent turn waits until released, so a
/// test can act while a comparison is in flight.
#[derive(Default)]
pub struct GatedGenerator {
    pub started: Notify,
    pub release: Notify,
}

#[async_trait]
impl GenerationProvider for GatedGenerator {
    fn model_name(&self) -> &str {
        "gated"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        if is_agent(messages) && assistant_turns(messages) == 0 {
            self.started.notify_one();
            self.release.notified().await;
        }
        BenchGenerator.generate(messages).await
    }
}

/// Agent never stops searching.
pub struct LoopingGenerator;

#[async_trait]
impl GenerationProvider for LoopingGenerator {
    fn model_name(&self) -> &str {
        "looping"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        if !is_agent(messages) {
            return Ok(STANDARD_REPLY.to_string());
        }
        Ok("THOUGHT: Still searching for the total.\n\
            TOOL_CALL: {\"tool\": \"semantic_search\", \"query\": \"total\"}"
            .to_string())
    }
}

/// Agent responses take longer than any test timeout.
pub struct StallingGenerator;

#[async_trait]
impl GenerationProvider for StallingGenerator {
    fn model_name(&self) -> &str {
        "stalling"
    }

    async fn generate(&self, messages: &[Message]) -> Result<String> {
        if is_agent(messages) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        Ok(STANDARD_REPLY.to_string())
    }
}

pub fn small_options() -> EngineOptions {
    let mut options = EngineOptions::default();
    options.session.chunk_size = 120;
    options.session.chunk_overlap = 20;
    options
}

pub fn engine_with(generator: Arc<dyn GenerationProvider>, options: EngineOptions) -> Engine {
    Engine::new(
        Arc::new(PdfLoader),
        Arc::new(HashingEmbedder::new(64)),
        generator,
        options,
    )
}

pub fn bench_engine() -> Engine {
    engine_with(Arc::new(BenchGenerator), small_options())
}
