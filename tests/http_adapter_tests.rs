//! Wire-level tests for the HTTP provider adapters, against a mock server.

use docqa::document::Unit;
use docqa::providers::{CohereEmbeddingClient, PineconeVectorStore};
use docqa::synthesis::{AnswerSynthesizer, ChatSynthesizer};
use docqa::{EmbeddingClient, EmbeddingMode, QaError, VectorStore};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn cohere_client(server: &MockServer) -> CohereEmbeddingClient {
    CohereEmbeddingClient::new("test-key")
        .unwrap()
        .with_endpoint(format!("{}/v1/embed", server.uri()))
        .with_dimensions(3)
}

fn pinecone_store(server: &MockServer) -> PineconeVectorStore {
    PineconeVectorStore::new("test-key", server.uri())
        .unwrap()
        .with_control_host(server.uri())
        .with_dimensions(3)
}

fn unit(document_id: &str, sequence_index: usize) -> Unit {
    Unit {
        document_id: document_id.to_string(),
        sequence_index,
        text: format!("unit {sequence_index}"),
        embedding: vec![0.1, 0.2, 0.3],
    }
}

// ── Embedding client ───────────────────────────────────────────────

#[tokio::test]
async fn embed_splits_batches_and_preserves_order() {
    let server = MockServer::start().await;
    let client = cohere_client(&server).with_batch_size(2);

    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .and(body_partial_json(json!({
            "texts": ["a", "b"],
            "input_type": "search_document",
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .and(body_partial_json(json!({ "texts": ["c"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.0, 0.0, 1.0]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let vectors = client.embed(&["a", "b", "c"], EmbeddingMode::Document).await.unwrap();
    assert_eq!(
        vectors,
        vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0], vec![0.0, 0.0, 1.0]]
    );
}

#[tokio::test]
async fn embed_sends_query_input_type_for_questions() {
    let server = MockServer::start().await;
    let client = cohere_client(&server);

    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .and(body_partial_json(json!({ "input_type": "search_query" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[0.5, 0.5, 0.0]],
        })))
        .expect(1)
        .mount(&server)
        .await;

    client.embed(&["a question?"], EmbeddingMode::Query).await.unwrap();
}

#[tokio::test]
async fn embed_wraps_provider_errors() {
    let server = MockServer::start().await;
    let client = cohere_client(&server);

    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "message": "quota exceeded" })),
        )
        .mount(&server)
        .await;

    let err = client.embed(&["text"], EmbeddingMode::Document).await.unwrap_err();
    match err {
        QaError::EmbeddingService { message, .. } => assert!(message.contains("quota exceeded")),
        other => panic!("expected EmbeddingService error, got {other}"),
    }
}

#[tokio::test]
async fn embed_rejects_short_responses() {
    let server = MockServer::start().await;
    let client = cohere_client(&server);

    // One embedding for two texts: the call must fail rather than return a
    // partial result.
    Mock::given(method("POST"))
        .and(path("/v1/embed"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "embeddings": [[1.0, 0.0, 0.0]],
        })))
        .mount(&server)
        .await;

    let err = client.embed(&["one", "two"], EmbeddingMode::Document).await.unwrap_err();
    assert!(matches!(err, QaError::EmbeddingService { .. }));
}

// ── Vector store ───────────────────────────────────────────────────

#[tokio::test]
async fn upsert_batches_records_sequentially() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server).with_upsert_batch_size(2);

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 2 })))
        .expect(3)
        .mount(&server)
        .await;

    let units: Vec<Unit> = (0..5).map(|i| unit("doc", i)).collect();
    store.upsert("doc", &units).await.unwrap();
}

#[tokio::test]
async fn upsert_records_carry_identity_and_metadata() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .and(body_partial_json(json!({
            "vectors": [{
                "id": "doc_0",
                "metadata": { "document_id": "doc", "sentence_id": 0, "text": "unit 0" },
            }],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    store.upsert("doc", &[unit("doc", 0)]).await.unwrap();
}

#[tokio::test]
async fn upsert_rejects_dimension_mismatch_before_sending() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    let mut bad = unit("doc", 0);
    bad.embedding = vec![0.1, 0.2];
    let err = store.upsert("doc", &[bad]).await.unwrap_err();
    assert!(matches!(err, QaError::VectorStore { .. }));
    assert!(err.to_string().contains("dimension mismatch"));
}

#[tokio::test]
async fn upsert_rejects_foreign_units_before_sending() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    // A unit tagged with another document would get an identity prefix
    // disagreeing with its metadata, splitting the exists-probe and the
    // filtered delete across two documents.
    Mock::given(method("POST"))
        .and(path("/vectors/upsert"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "upsertedCount": 1 })))
        .expect(0)
        .mount(&server)
        .await;

    let err = store.upsert("doc", &[unit("other", 0)]).await.unwrap_err();
    match err {
        QaError::VectorStore { operation, message, .. } => {
            assert_eq!(operation, "upsert");
            assert!(message.contains("does not belong"));
        }
        other => panic!("expected VectorStore error, got {other}"),
    }
}

#[tokio::test]
async fn query_filters_by_document_and_parses_matches() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "topK": 3,
            "includeMetadata": true,
            "filter": { "document_id": { "$eq": "doc" } },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [
                { "id": "doc_1", "score": 0.9, "metadata": { "text": "best" } },
                { "id": "doc_0", "score": 0.4, "metadata": { "text": "weaker" } },
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let matches = store.query("doc", &[0.1, 0.2, 0.3], 3).await.unwrap();
    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].id, "doc_1");
    assert_eq!(matches[0].text, "best");
    assert!(matches[0].score > matches[1].score);
}

#[tokio::test]
async fn exists_fetches_the_sequence_zero_identity() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", "present_0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "vectors": { "present_0": { "id": "present_0" } },
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/vectors/fetch"))
        .and(query_param("ids", "absent_0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "vectors": {} })))
        .mount(&server)
        .await;

    assert!(store.exists("present").await.unwrap());
    assert!(!store.exists("absent").await.unwrap());
}

#[tokio::test]
async fn delete_resolves_identities_then_bulk_deletes() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({
            "filter": { "document_id": { "$eq": "doc" } },
            "includeMetadata": false,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{ "id": "doc_0" }, { "id": "doc_1" }],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .and(body_partial_json(json!({ "ids": ["doc_0", "doc_1"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store.delete("doc").await.unwrap();
}

#[tokio::test]
async fn delete_of_empty_document_skips_the_bulk_call() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "matches": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/vectors/delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    store.delete("doc").await.unwrap();
}

#[tokio::test]
async fn store_errors_name_the_failing_operation() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500).set_body_string("index unavailable"))
        .mount(&server)
        .await;

    let err = store.query("doc", &[0.1, 0.2, 0.3], 3).await.unwrap_err();
    match err {
        QaError::VectorStore { operation, message, .. } => {
            assert_eq!(operation, "query");
            assert!(message.contains("index unavailable"));
        }
        other => panic!("expected VectorStore error, got {other}"),
    }
}

#[tokio::test]
async fn ensure_index_is_idempotent() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "indexes": [{ "name": "document-indexer" }],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    store.ensure_index().await.unwrap();
}

#[tokio::test]
async fn ensure_index_creates_a_missing_index() {
    let server = MockServer::start().await;
    let store = pinecone_store(&server);

    Mock::given(method("GET"))
        .and(path("/indexes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "indexes": [] })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/indexes"))
        .and(body_partial_json(json!({
            "name": "document-indexer",
            "dimension": 3,
            "metric": "cosine",
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    store.ensure_index().await.unwrap();
}

// ── Answer synthesizer ─────────────────────────────────────────────

#[tokio::test]
async fn synthesizer_sends_role_tagged_messages_and_returns_raw_text() {
    let server = MockServer::start().await;
    let synthesizer = ChatSynthesizer::new(format!("{}/api/llm", server.uri())).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/llm"))
        .and(body_partial_json(json!({
            "messages": [
                { "role": "assistant" },
                { "role": "user" },
            ],
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("The answer is 42."))
        .expect(1)
        .mount(&server)
        .await;

    let answer = synthesizer
        .synthesize("What is the answer?", &["Some context.".to_string()])
        .await
        .unwrap();
    assert_eq!(answer, "The answer is 42.");
}

#[tokio::test]
async fn synthesizer_failure_is_a_typed_error_not_an_answer() {
    let server = MockServer::start().await;
    let synthesizer = ChatSynthesizer::new(format!("{}/api/llm", server.uri())).unwrap();

    Mock::given(method("POST"))
        .and(path("/api/llm"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream down"))
        .mount(&server)
        .await;

    let err = synthesizer.synthesize("Question?", &[]).await.unwrap_err();
    match err {
        QaError::SynthesisService { message, .. } => assert!(message.contains("upstream down")),
        other => panic!("expected SynthesisService error, got {other}"),
    }
}
