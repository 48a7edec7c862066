//! Embedding client trait for converting text into vectors.

use async_trait::async_trait;

use crate::error::Result;

/// The intent behind an embedding request.
///
/// Asymmetric embedding models represent documents and queries differently.
/// Callers must use [`Document`](EmbeddingMode::Document) when indexing and
/// [`Query`](EmbeddingMode::Query) when embedding a question; mixing them up
/// silently degrades retrieval quality rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingMode {
    /// Embedding texts for indexing.
    Document,
    /// Embedding a question for retrieval.
    Query,
}

impl EmbeddingMode {
    /// The wire-level `input_type` value for this mode.
    pub fn as_input_type(self) -> &'static str {
        match self {
            EmbeddingMode::Document => "search_document",
            EmbeddingMode::Query => "search_query",
        }
    }
}

/// A client that converts texts into fixed-dimension embedding vectors.
///
/// Implementations wrap a specific embedding backend behind a unified async
/// interface. The batch contract is atomic: the result has exactly one
/// vector per input text, in input order, or the whole call fails — partial
/// results are never returned. Implementations may split large inputs into
/// provider-limited sub-batches internally, as long as results are
/// reassembled in the original order.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Embed a batch of texts.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::EmbeddingService`](crate::QaError::EmbeddingService)
    /// on any provider failure (quota, network, malformed input), carrying
    /// the upstream error detail.
    async fn embed(&self, texts: &[&str], mode: EmbeddingMode) -> Result<Vec<Vec<f32>>>;

    /// Return the dimensionality of vectors produced by this client.
    fn dimensions(&self) -> usize;
}
