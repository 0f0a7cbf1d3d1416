//! Single-shot retrieve-then-generate pipeline.
//!
//! Retrieves the top chunks from the semantic index only, joins them into
//! a context block, and makes exactly one generation request.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::Result;
use crate::llm::{GenerationProvider, Message};
use crate::metrics::Metrics;
use crate::models::PipelineAnswer;
use crate::session::Session;

pub const SYSTEM_PROMPT: &str =
    "You are a helpful assistant. Answer the question based ONLY on the provided context.";

pub fn user_prompt(context: &str, query: &str) -> String {
    format!("Context:\n{}\n\nQuestion: {}", context, query)
}

#[derive(Clone)]
pub struct StandardPipeline {
    session: Arc<Session>,
    generator: Arc<dyn GenerationProvider>,
    top_k: usize,
}

impl StandardPipeline {
    pub fn new(
        session: Arc<Session>,
        generator: Arc<dyn GenerationProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            session,
            generator,
            top_k,
        }
    }

    pub async fn answer(&self, query: &str) -> Result<PipelineAnswer> {
        let hits = self.session.semantic().query(query, self.top_k).await?;
        let context = hits
            .iter()
            .filter_map(|hit| self.session.chunk_at(hit.position))
            .map(|c| c.text.as_str())
            .collect::<Vec<_>>()
            .join("\n\n");
        debug!(
            retrieved = hits.len(),
            context_chars = context.len(),
            "standard context built"
        );

        let messages = [
            Message::system(SYSTEM_PROMPT),
            Message::user(user_prompt(&context, query)),
        ];

        let started = Instant::now();
        let answer = self.generator.generate(&messages).await?;
        let elapsed = started.elapsed();

        let metrics = Metrics::standard(hits.len(), elapsed, &[&context, query, &answer]);
        info!(
            retrieved_docs = hits.len(),
            latency = metrics.latency,
            tokens = metrics.tokens,
            "standard pipeline answered"
        );

        Ok(PipelineAnswer { answer, metrics })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashingEmbedder;
    use crate::error::RagError;
    use crate::session::SessionOptions;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Records every request and replies with a fixed answer.
    struct RecordingGenerator {
        reply: Result<String>,
        seen: Mutex<Vec<Vec<Message>>>,
    }

    impl RecordingGenerator {
        fn ok(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl GenerationProvider for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn generate(&self, messages: &[Message]) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            match &self.reply {
                Ok(s) => Ok(s.clone()),
                Err(_) => Err(RagError::Provider("HTTP 503".to_string())),
            }
        }
    }

    async fn session(text: &str, size: usize) -> Arc<Session> {
        let options = SessionOptions {
            chunk_size: size,
            chunk_overlap: 0,
            embed_batch_size: 16,
        };
        Arc::new(
            Session::build(text, options, Arc::new(HashingEmbedder::new(128)))
                .await
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_one_generation_call_with_context() {
        let text = (1..=8)
            .map(|i| format!("Line item {} costs {} dollars.", i, i * 10))
            .collect::<Vec<_>>()
            .join("\n\n");
        let session = session(&text, 40).await;
        let generator = Arc::new(RecordingGenerator::ok("The total is 360 dollars."));
        let pipeline = StandardPipeline::new(session, generator.clone(), 5);

        let result = pipeline.answer("What is the total?").await.unwrap();
        assert_eq!(result.answer, "The total is 360 dollars.");
        assert_eq!(result.metrics.retrieved_docs, Some(5));
        assert_eq!(result.metrics.steps, 1);
        assert!(result.metrics.tokens > 0);

        let seen = generator.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0][0].content, SYSTEM_PROMPT);
        assert!(seen[0][1].content.starts_with("Context:\n"));
        assert!(seen[0][1].content.ends_with("\n\nQuestion: What is the total?"));
    }

    #[tokio::test]
    async fn test_retrieved_docs_capped_by_chunk_count() {
        let session = session("Only one short chunk here.", 1000).await;
        let pipeline =
            StandardPipeline::new(session, Arc::new(RecordingGenerator::ok("ok")), 5);
        let result = pipeline.answer("anything").await.unwrap();
        assert_eq!(result.metrics.retrieved_docs, Some(1));
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let session = session("Some text.", 1000).await;
        let generator = RecordingGenerator {
            reply: Err(RagError::Provider(String::new())),
            seen: Mutex::new(Vec::new()),
        };
        let pipeline = StandardPipeline::new(session, Arc::new(generator), 5);
        let err = pipeline.answer("q").await.unwrap_err();
        assert!(matches!(err, RagError::Provider(_)));
    }

    #[test]
    fn test_user_prompt_format() {
        assert_eq!(user_prompt("ctx", "q?"), "Context:\nctx\n\nQuestion: q?");
    }
}
