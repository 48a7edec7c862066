//! Pinecone-style vector store adapter over the REST data plane.
//!
//! Maps the crate's [`VectorStore`] contract onto an index service with
//! upsert / query / fetch / delete endpoints and metadata filtering. All
//! provider response shapes are translated into typed structures here;
//! nothing provider-specific escapes this module.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error};

use crate::document::{QueryMatch, Unit, unit_identity};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorStore;

/// The default control-plane base URL (index management).
const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";

/// The default index name.
const DEFAULT_INDEX_NAME: &str = "document-indexer";

/// The default index dimensionality.
const DEFAULT_DIMENSIONS: usize = 1024;

/// Maximum records per upsert request.
const UPSERT_BATCH_SIZE: usize = 100;

/// `top_k` used when resolving a document's full identity set for deletion.
/// Bounds the number of units a single document may have.
const DELETE_SCAN_TOP_K: usize = 10_000;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A [`VectorStore`] backed by a Pinecone-style HTTP index service.
///
/// Records are keyed by unit identity and carry `{document_id, sentence_id,
/// text}` metadata; queries filter on `document_id` equality so documents
/// never leak into each other's results. Upserts are split into sequential
/// sub-batches of at most 100 records — a failure partway through leaves
/// the document partially indexed (at-least-once, non-transactional).
pub struct PineconeVectorStore {
    client: reqwest::Client,
    api_key: String,
    index_host: String,
    control_host: String,
    index_name: String,
    dimensions: usize,
    upsert_batch_size: usize,
}

impl PineconeVectorStore {
    /// Create a new store talking to the given data-plane index host.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::VectorStore`] if the key or host is empty or the
    /// HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>, index_host: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, index_host, DEFAULT_TIMEOUT)
    }

    /// Create a new store with an explicit request timeout.
    ///
    /// A timed-out call surfaces as the same typed error as any other
    /// provider failure.
    pub fn with_timeout(
        api_key: impl Into<String>,
        index_host: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_key = api_key.into();
        let index_host = index_host.into();
        if api_key.is_empty() {
            return Err(store_err("new", "API key must not be empty"));
        }
        if index_host.is_empty() {
            return Err(store_err("new", "index host must not be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| store_err("new", format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            index_host,
            control_host: CONTROL_PLANE_URL.into(),
            index_name: DEFAULT_INDEX_NAME.into(),
            dimensions: DEFAULT_DIMENSIONS,
            upsert_batch_size: UPSERT_BATCH_SIZE,
        })
    }

    /// Create a new store from the `PINECONE_API_KEY` and
    /// `PINECONE_INDEX_HOST` environment variables.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("PINECONE_API_KEY")
            .map_err(|_| store_err("new", "PINECONE_API_KEY environment variable not set"))?;
        let index_host = std::env::var("PINECONE_INDEX_HOST")
            .map_err(|_| store_err("new", "PINECONE_INDEX_HOST environment variable not set"))?;
        Self::new(api_key, index_host)
    }

    /// Override the control-plane base URL (for proxies and tests).
    pub fn with_control_host(mut self, host: impl Into<String>) -> Self {
        self.control_host = host.into();
        self
    }

    /// Set the index name used by [`ensure_index`](VectorStore::ensure_index).
    pub fn with_index_name(mut self, name: impl Into<String>) -> Self {
        self.index_name = name.into();
        self
    }

    /// Set the expected index dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    /// Override the upsert sub-batch size (for tests; defaults to 100).
    pub fn with_upsert_batch_size(mut self, size: usize) -> Self {
        self.upsert_batch_size = size.max(1);
        self
    }

    fn check_dimensions(&self, got: usize, operation: &str) -> Result<()> {
        if got != self.dimensions {
            return Err(store_err(
                operation,
                format!("embedding dimension mismatch: index expects {}, got {got}", self.dimensions),
            ));
        }
        Ok(())
    }

    /// Issue a data-plane POST and fail with a typed error on any non-2xx
    /// status, so raw provider errors never cross the module boundary.
    async fn post_json<B: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &B,
        operation: &str,
    ) -> Result<reqwest::Response> {
        let response = self
            .client
            .post(url)
            .header("Api-Key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                error!(backend = "pinecone", operation, error = %e, "request failed");
                store_err(operation, format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            error!(backend = "pinecone", operation, %status, "API error");
            return Err(store_err(operation, format!("API returned {status}: {detail}")));
        }

        Ok(response)
    }

    /// Resolve all unit identities belonging to a document.
    ///
    /// Identities are not enumerable directly, so this issues a broad
    /// document-filtered query with a dummy vector; only the match IDs are
    /// used.
    async fn resolve_document_ids(&self, document_id: &str) -> Result<Vec<String>> {
        let request = QueryRequest {
            vector: vec![0.0; self.dimensions],
            top_k: DELETE_SCAN_TOP_K,
            filter: document_filter(document_id),
            include_metadata: false,
        };

        let url = format!("{}/query", self.index_host);
        let response = self.post_json(&url, &request, "delete").await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| store_err("delete", format!("failed to parse response: {e}")))?;

        Ok(parsed.matches.into_iter().map(|m| m.id).collect())
    }
}

fn store_err(operation: &str, message: impl Into<String>) -> QaError {
    QaError::VectorStore {
        backend: "pinecone".into(),
        operation: operation.into(),
        message: message.into(),
    }
}

/// Build the metadata filter restricting an operation to one document.
fn document_filter(document_id: &str) -> serde_json::Value {
    json!({ "document_id": { "$eq": document_id } })
}

// ── Wire request/response types ────────────────────────────────────

#[derive(Serialize)]
struct RecordMetadata<'a> {
    document_id: &'a str,
    sentence_id: usize,
    text: &'a str,
}

#[derive(Serialize)]
struct VectorRecord<'a> {
    id: String,
    values: &'a [f32],
    metadata: RecordMetadata<'a>,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord<'a>],
}

#[derive(Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    filter: serde_json::Value,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<ApiMatch>,
}

#[derive(Deserialize)]
struct ApiMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<MatchMetadata>,
}

#[derive(Deserialize)]
struct MatchMetadata {
    #[serde(default)]
    text: String,
}

#[derive(Deserialize)]
struct FetchResponse {
    #[serde(default)]
    vectors: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct ListIndexesResponse {
    #[serde(default)]
    indexes: Vec<IndexSummary>,
}

#[derive(Deserialize)]
struct IndexSummary {
    name: String,
}

// ── VectorStore implementation ─────────────────────────────────────

#[async_trait]
impl VectorStore for PineconeVectorStore {
    async fn ensure_index(&self) -> Result<()> {
        let list_url = format!("{}/indexes", self.control_host);
        let response = self
            .client
            .get(&list_url)
            .header("Api-Key", &self.api_key)
            .send()
            .await
            .map_err(|e| store_err("ensure_index", format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(store_err("ensure_index", format!("API returned {status}: {detail}")));
        }

        let listing: ListIndexesResponse = response
            .json()
            .await
            .map_err(|e| store_err("ensure_index", format!("failed to parse response: {e}")))?;

        if listing.indexes.iter().any(|idx| idx.name == self.index_name) {
            debug!(index = %self.index_name, "index already exists, skipping creation");
            return Ok(());
        }

        let create = json!({
            "name": self.index_name,
            "dimension": self.dimensions,
            "metric": "cosine",
            "spec": { "serverless": { "cloud": "aws", "region": "us-east-1" } },
        });
        self.post_json(&list_url, &create, "ensure_index").await?;
        debug!(index = %self.index_name, dimensions = self.dimensions, "created index");
        Ok(())
    }

    async fn upsert(&self, document_id: &str, units: &[Unit]) -> Result<()> {
        if units.is_empty() {
            return Ok(());
        }
        for unit in units {
            self.check_dimensions(unit.embedding.len(), "upsert")?;
            // A unit keyed under one document but tagged with another would
            // make the identity probe and the metadata filter disagree.
            if unit.document_id != document_id {
                return Err(store_err(
                    "upsert",
                    format!(
                        "unit '{}' does not belong to document '{document_id}'",
                        unit.identity()
                    ),
                ));
            }
        }

        let records: Vec<VectorRecord<'_>> = units
            .iter()
            .map(|unit| VectorRecord {
                id: unit.identity(),
                values: &unit.embedding,
                metadata: RecordMetadata {
                    document_id,
                    sentence_id: unit.sequence_index,
                    text: &unit.text,
                },
            })
            .collect();

        let url = format!("{}/vectors/upsert", self.index_host);
        for batch in records.chunks(self.upsert_batch_size) {
            let request = UpsertRequest { vectors: batch };
            self.post_json(&url, &request, "upsert").await?;
        }

        debug!(backend = "pinecone", document_id, count = units.len(), "upserted units");
        Ok(())
    }

    async fn query(
        &self,
        document_id: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        self.check_dimensions(embedding.len(), "query")?;

        let request = QueryRequest {
            vector: embedding.to_vec(),
            top_k,
            filter: document_filter(document_id),
            include_metadata: true,
        };

        let url = format!("{}/query", self.index_host);
        let response = self.post_json(&url, &request, "query").await?;
        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| store_err("query", format!("failed to parse response: {e}")))?;

        Ok(parsed
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                text: m.metadata.map(|meta| meta.text).unwrap_or_default(),
                score: m.score,
            })
            .collect())
    }

    async fn exists(&self, document_id: &str) -> Result<bool> {
        let probe_id = unit_identity(document_id, 0);
        let url = format!("{}/vectors/fetch", self.index_host);
        let response = self
            .client
            .get(&url)
            .header("Api-Key", &self.api_key)
            .query(&[("ids", probe_id.as_str())])
            .send()
            .await
            .map_err(|e| store_err("exists", format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(store_err("exists", format!("API returned {status}: {detail}")));
        }

        let parsed: FetchResponse = response
            .json()
            .await
            .map_err(|e| store_err("exists", format!("failed to parse response: {e}")))?;

        Ok(!parsed.vectors.is_empty())
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let ids = self.resolve_document_ids(document_id).await?;
        if ids.is_empty() {
            debug!(backend = "pinecone", document_id, "no units to delete");
            return Ok(());
        }

        let url = format!("{}/vectors/delete", self.index_host);
        self.post_json(&url, &json!({ "ids": ids }), "delete").await?;
        debug!(backend = "pinecone", document_id, "deleted document units");
        Ok(())
    }
}
