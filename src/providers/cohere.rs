//! Cohere-style embedding client over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::{EmbeddingClient, EmbeddingMode};
use crate::error::{QaError, Result};

/// The default Cohere embed endpoint.
const COHERE_EMBED_URL: &str = "https://api.cohere.com/v1/embed";

/// The default embedding model.
const DEFAULT_MODEL: &str = "embed-english-v3.0";

/// The default dimensionality for `embed-english-v3.0`.
const DEFAULT_DIMENSIONS: usize = 1024;

/// The maximum number of texts sent per request.
const DEFAULT_BATCH_SIZE: usize = 96;

/// Default request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// An [`EmbeddingClient`] backed by the Cohere embed API.
///
/// Asymmetric embeddings: [`EmbeddingMode`] maps to the API's `input_type`
/// field (`search_document` / `search_query`). Inputs larger than the batch
/// limit are split into sequential requests and the results reassembled in
/// input order; any failed sub-batch fails the whole call.
///
/// # Example
///
/// ```rust,ignore
/// use docqa::providers::CohereEmbeddingClient;
/// use docqa::{EmbeddingClient, EmbeddingMode};
///
/// let client = CohereEmbeddingClient::from_env()?;
/// let vectors = client.embed(&["hello world"], EmbeddingMode::Document).await?;
/// assert_eq!(vectors[0].len(), client.dimensions());
/// ```
pub struct CohereEmbeddingClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    dimensions: usize,
    batch_size: usize,
}

impl CohereEmbeddingClient {
    /// Create a new client with the given API key and default model.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::EmbeddingService`] if the key is empty or the
    /// HTTP client cannot be constructed.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, DEFAULT_TIMEOUT)
    }

    /// Create a new client with an explicit request timeout.
    ///
    /// A timed-out call surfaces as the same typed error as any other
    /// provider failure.
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Self::service_err("API key must not be empty"));
        }

        let client = reqwest::Client::builder().timeout(timeout).build().map_err(|e| {
            Self::service_err(format!("failed to build HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            endpoint: COHERE_EMBED_URL.into(),
            api_key,
            model: DEFAULT_MODEL.into(),
            dimensions: DEFAULT_DIMENSIONS,
            batch_size: DEFAULT_BATCH_SIZE,
        })
    }

    /// Create a new client using the `COHERE_API_KEY` environment variable.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("COHERE_API_KEY")
            .map_err(|_| Self::service_err("COHERE_API_KEY environment variable not set"))?;
        Self::new(api_key)
    }

    /// Override the embed endpoint (for proxies and tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the model name (e.g. `embed-multilingual-v3.0`).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the expected output dimensionality.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    /// Set the maximum number of texts per request.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    fn service_err(message: impl Into<String>) -> QaError {
        QaError::EmbeddingService { provider: "cohere".into(), message: message.into() }
    }

    async fn embed_one_batch(&self, texts: &[&str], mode: EmbeddingMode) -> Result<Vec<Vec<f32>>> {
        let request = EmbedRequest {
            texts,
            model: &self.model,
            input_type: mode.as_input_type(),
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(provider = "cohere", error = %e, "embedding request failed");
                Self::service_err(format!("request failed: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.message)
                .unwrap_or(body);
            error!(provider = "cohere", %status, "embedding API error");
            return Err(Self::service_err(format!("API returned {status}: {detail}")));
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            error!(provider = "cohere", error = %e, "failed to parse embedding response");
            Self::service_err(format!("failed to parse response: {e}"))
        })?;

        if parsed.embeddings.len() != texts.len() {
            return Err(Self::service_err(format!(
                "API returned {} embeddings for {} texts",
                parsed.embeddings.len(),
                texts.len()
            )));
        }

        Ok(parsed.embeddings)
    }
}

// ── Cohere API request/response types ──────────────────────────────

#[derive(Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [&'a str],
    model: &'a str,
    input_type: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    message: String,
}

// ── EmbeddingClient implementation ─────────────────────────────────

#[async_trait]
impl EmbeddingClient for CohereEmbeddingClient {
    async fn embed(&self, texts: &[&str], mode: EmbeddingMode) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = "cohere",
            text_count = texts.len(),
            model = %self.model,
            input_type = mode.as_input_type(),
            "embedding texts"
        );

        // Sub-batches are issued sequentially and collected in input order.
        // Nothing is returned until every sub-batch has succeeded, so the
        // caller never observes a partial result.
        let mut results = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            results.extend(self.embed_one_batch(batch, mode).await?);
        }

        Ok(results)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
