//! Engine-level behaviour over a three-page document with offline providers.

mod common;

use std::sync::Arc;
use std::time::Duration;

use arag_bench_core::tools::{ToolCall, NOT_FOUND};
use arag_bench_core::RagError;
use common::*;

#[tokio::test]
async fn queries_before_ingest_report_readiness_errors() {
    let engine = bench_engine();

    assert!(matches!(
        engine.compare("What is the total?", None).await,
        Err(RagError::NoDocumentIndexed)
    ));
    assert!(matches!(
        engine.standard("What is the total?").await,
        Err(RagError::IndexNotReady)
    ));
    assert!(matches!(
        engine.agentic("What is the total?").await,
        Err(RagError::AgentNotInitialized)
    ));
    assert!(engine.current_document().await.is_none());
}

#[tokio::test]
async fn compare_over_three_page_invoice() {
    let engine = bench_engine();
    let report = engine
        .ingest(three_page_invoice().as_bytes())
        .await
        .unwrap();
    assert!(report.chunks >= 3, "expected several chunks, got {}", report.chunks);

    let result = engine
        .compare("What is the total?", Some(&report.document_id))
        .await
        .unwrap();

    assert_eq!(result.standard.answer, STANDARD_REPLY);
    assert_eq!(
        result.standard.metrics.retrieved_docs,
        Some(report.chunks.min(5))
    );
    assert_eq!(result.standard.metrics.steps, 1);
    assert!(result.standard.metrics.tokens > 0);

    let agentic = &result.agentic;
    assert_eq!(agentic.answer, AGENT_REPLY);
    assert_eq!(agentic.metrics.steps, 2);
    assert!(agentic.metrics.steps <= engine.options().max_steps);
    assert_eq!(agentic.metrics.exhausted, Some(false));
    assert_eq!(agentic.metrics.retrieved_docs, None);
    assert_eq!(agentic.trace[0].call.name(), "keyword_search");
    assert_eq!(agentic.trace[1].call.name(), "read_chunk");
    assert!(agentic.trace[1].observation.contains("42"));
}

#[tokio::test]
async fn comparison_serializes_with_expected_fields() {
    let engine = bench_engine();
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();
    let result = engine.compare("What is the total?", None).await.unwrap();

    let json = serde_json::to_value(&result).unwrap();
    assert!(json["standard"]["metrics"]["retrieved_docs"].is_u64());
    assert!(json["standard"]["metrics"].get("exhausted").is_none());
    assert!(json["agentic"]["metrics"].get("retrieved_docs").is_none());
    assert_eq!(json["agentic"]["trace"][0]["call"]["tool"], "keyword_search");
}

#[tokio::test]
async fn stale_document_id_uses_active_document() {
    let engine = bench_engine();
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();

    let result = engine
        .compare("What is the total?", Some("not-a-real-id"))
        .await
        .unwrap();
    assert_eq!(result.agentic.answer, AGENT_REPLY);
}

#[tokio::test]
async fn reingest_invalidates_previous_chunk_ids() {
    let engine = bench_engine();
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();
    let first = engine.snapshot().await.unwrap();
    let old_id = first.session.store().chunks()[0].id.clone();
    assert!(first.agent.tools().read_chunk(&old_id).is_ok());

    let second_report = engine
        .ingest(b"A different document about shipping schedules.")
        .await
        .unwrap();
    let second = engine.snapshot().await.unwrap();
    assert_eq!(second.session.document().id, second_report.document_id);
    assert_ne!(second.session.document().id, first.session.document().id);

    let observation = second
        .agent
        .tools()
        .invoke(&ToolCall::ReadChunk { chunk_id: old_id })
        .await
        .unwrap();
    assert_eq!(observation, NOT_FOUND);
}

#[tokio::test]
async fn empty_document_keeps_previous_session() {
    let engine = bench_engine();
    let report = engine
        .ingest(three_page_invoice().as_bytes())
        .await
        .unwrap();

    let err = engine.ingest(b"  \n\n\t ").await.unwrap_err();
    assert!(matches!(err, RagError::EmptyDocument));

    let current = engine.current_document().await.unwrap();
    assert_eq!(current.id, report.document_id);
    assert!(engine.compare("What is the total?", None).await.is_ok());
}

#[tokio::test]
async fn undecodable_upload_is_a_load_error() {
    let engine = bench_engine();
    let err = engine.ingest(&[0xff, 0xfe, 0x00, 0x81]).await.unwrap_err();
    assert!(matches!(err, RagError::Load(_)));
    assert!(engine.current_document().await.is_none());
}

#[tokio::test]
async fn agent_stops_at_step_bound() {
    let mut options = small_options();
    options.max_steps = 3;
    let engine = engine_with(Arc::new(LoopingGenerator), options);
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();

    let answer = engine.agentic("What is the total?").await.unwrap();
    assert_eq!(answer.metrics.steps, 3);
    assert_eq!(answer.trace.len(), 3);
    assert_eq!(answer.metrics.exhausted, Some(true));
    assert_eq!(answer.answer, "Still searching for the total.");
}

#[tokio::test]
async fn agent_run_times_out() {
    let mut options = small_options();
    options.agent_timeout = Duration::from_millis(50);
    let engine = engine_with(Arc::new(StallingGenerator), options);
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();

    let err = engine.agentic("What is the total?").await.unwrap_err();
    assert!(matches!(err, RagError::Timeout { .. }));

    // The standard path is unaffected by the agent timeout.
    let standard = engine.standard("What is the total?").await.unwrap();
    assert_eq!(standard.answer, STANDARD_REPLY);
}

#[tokio::test]
async fn fresh_chunk_ids_resolve_and_searches_are_bounded() {
    let engine = bench_engine();
    engine.ingest(three_page_invoice().as_bytes()).await.unwrap();
    let active = engine.snapshot().await.unwrap();
    let tools = active.agent.tools();

    let mut seen = std::collections::HashSet::new();
    for chunk in active.session.store().chunks() {
        assert!(seen.insert(chunk.id.clone()), "duplicate id {}", chunk.id);
        assert_eq!(tools.read_chunk(&chunk.id).unwrap().text, chunk.text);
    }

    let keyword = tools.keyword_search("dollars");
    assert!(!keyword.is_empty() && keyword.len() <= 3);
    let semantic = tools.semantic_search("how much is owed").await.unwrap();
    assert!(!semantic.is_empty() && semantic.len() <= 3);
}

#[tokio::test]
async fn embedding_failure_leaves_engine_empty() {
    let engine = arag_bench::engine::Engine::new(
        Arc::new(arag_bench::extract::PdfLoader),
        Arc::new(arag_bench::embedding::DisabledProvider),
        Arc::new(BenchGenerator),
        small_options(),
    );
    let err = engine
        .ingest(three_page_invoice().as_bytes())
        .await
        .unwrap_err();
    assert!(matches!(err, RagError::Provider(_)));
    assert!(engine.snapshot().await.is_none());
}

#[tokio::test]
async fn compare_keeps_its_snapshot_while_a_new_document_is_ingested() {
    let generator = Arc::new(GatedGenerator::default());
    let engine = Arc::new(engine_with(generator.clone(), small_options()));
    let first_report = engine
        .ingest(three_page_invoice().as_bytes())
        .await
        .unwrap();
    let first = engine.snapshot().await.unwrap();
    assert!(first_report.chunks > 1);

    let running = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.compare("What is the total?", None).await })
    };
    tokio::time::timeout(Duration::from_secs(5), generator.started.notified())
        .await
        .expect("agent never started");

    let second_report = engine
        .ingest(b"Shipping schedules are published every Monday.")
        .await
        .unwrap();
    generator.release.notify_one();

    let result = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("compare did not finish")
        .unwrap()
        .unwrap();
    let second = engine.snapshot().await.unwrap();
    assert_eq!(second.session.document().id, second_report.document_id);

    assert_eq!(
        result.standard.metrics.retrieved_docs,
        Some(first_report.chunks.min(5))
    );
    assert_eq!(result.agentic.answer, AGENT_REPLY);
    assert!(result.agentic.trace[1].observation.contains("42"));

    let mut ids = Vec::new();
    for step in &result.agentic.trace {
        if let ToolCall::ReadChunk { chunk_id } = &step.call {
            ids.push(chunk_id.clone());
        }
        ids.extend(chunk_ids_in(&step.observation));
    }
    assert!(!ids.is_empty());
    for id in ids {
        assert!(first.agent.tools().read_chunk(&id).is_ok(), "{} not in first", id);
        let observation = second
            .agent
            .tools()
            .invoke(&ToolCall::ReadChunk { chunk_id: id })
            .await
            .unwrap();
        assert_eq!(observation, NOT_FOUND);
    }
}
