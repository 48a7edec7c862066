//! QA pipeline orchestrator.
//!
//! The [`QaPipeline`] coordinates the full ingest-and-answer workflow by
//! composing a [`Chunker`], an [`EmbeddingClient`], a [`VectorStore`], and
//! an [`AnswerSynthesizer`]. All dependencies are injected at construction
//! time so every collaborator can be substituted with a fake in tests.
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa::{QaConfig, QaPipeline, InMemoryVectorStore};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_client(Arc::new(embedder))
//!     .vector_store(Arc::new(InMemoryVectorStore::new(1024)))
//!     .synthesizer(Arc::new(synthesizer))
//!     .build()?;
//!
//! pipeline.ensure_index().await?;
//! let document_id = pipeline.add_document(Path::new("report.pdf")).await?;
//! let answer = pipeline.get_answer("What is the summary?", &document_id).await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use crate::chunking::{Chunker, SentenceChunker, extract_text};
use crate::config::QaConfig;
use crate::document::Unit;
use crate::embedding::{EmbeddingClient, EmbeddingMode};
use crate::error::{QaError, Result};
use crate::synthesis::AnswerSynthesizer;
use crate::vectorstore::VectorStore;

/// The fixed answer returned when retrieval finds no context for a question.
///
/// The synthesizer is not called in that case; an ungrounded answer would be
/// indistinguishable from a grounded one to the caller.
pub const NO_RELEVANT_CONTENT: &str = "No relevant content found for this question.";

/// Derive a stable document ID from the document's file name.
///
/// The file stem is sanitized: runs of non-alphanumeric characters (other
/// than `_`) collapse to a single `-`, and edge dashes are trimmed. The same
/// logical document yields the same ID across calls — which also means
/// re-adding a file with the same name overwrites the previous document's
/// units (upsert, not append). Distinct file names can still collide after
/// sanitization (`a b.pdf` and `a-b.pdf` both become `a-b`); callers needing
/// guaranteed-unique IDs use [`QaPipeline::add_document_with_id`].
fn derive_document_id(path: &Path) -> Result<String> {
    let parse_err = || QaError::DocumentParse {
        path: path.display().to_string(),
        message: "cannot derive a document ID from the file name".to_string(),
    };

    let stem = path.file_stem().and_then(|s| s.to_str()).ok_or_else(parse_err)?;

    let mut id = String::with_capacity(stem.len());
    for c in stem.chars() {
        let mapped = if c.is_ascii_alphanumeric() || c == '_' { c } else { '-' };
        if mapped == '-' && id.ends_with('-') {
            continue;
        }
        id.push(mapped);
    }

    let id = id.trim_matches('-');
    if id.is_empty() {
        return Err(parse_err());
    }
    Ok(id.to_string())
}

/// The question-answering pipeline.
///
/// Stateless and request-scoped: the vector store is the only shared
/// mutable resource, and no local cache of its contents is kept, so every
/// call reflects the store's state at call time. Construct one via
/// [`QaPipeline::builder()`].
pub struct QaPipeline {
    config: QaConfig,
    chunker: Arc<dyn Chunker>,
    embedding_client: Arc<dyn EmbeddingClient>,
    vector_store: Arc<dyn VectorStore>,
    synthesizer: Arc<dyn AnswerSynthesizer>,
}

impl std::fmt::Debug for QaPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QaPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &QaConfig {
        &self.config
    }

    /// Ensure the vector store's index exists. Idempotent; call once at
    /// bootstrap.
    pub async fn ensure_index(&self) -> Result<()> {
        self.vector_store.ensure_index().await
    }

    /// Ingest a document, deriving its ID from the file name.
    ///
    /// See [`add_document_with_id`](Self::add_document_with_id).
    pub async fn add_document(&self, path: &Path) -> Result<String> {
        let document_id = derive_document_id(path)?;
        self.add_document_with_id(path, document_id).await
    }

    /// Ingest a document under a caller-supplied ID: chunk → embed → upsert.
    ///
    /// Re-using the ID of an existing document overwrites that document's
    /// units (upsert, not append). An empty document still returns its ID;
    /// since no unit is indexed at sequence 0,
    /// [`exists`](Self::exists) will report `false` for it.
    ///
    /// # Errors
    ///
    /// Any component failure aborts the ingestion and surfaces its typed
    /// error; the caller sees either a document ID or an error, never both.
    /// A failure inside a batched upsert can leave the document partially
    /// indexed (documented at-least-once limitation).
    pub async fn add_document_with_id(
        &self,
        path: &Path,
        document_id: impl Into<String>,
    ) -> Result<String> {
        let document_id = document_id.into();

        let text = extract_text(path).await?;
        let texts = self.chunker.chunk(&text);
        if texts.is_empty() {
            info!(%document_id, unit_count = 0, "ingested document (empty)");
            return Ok(document_id);
        }

        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let embeddings =
            self.embedding_client.embed(&refs, EmbeddingMode::Document).await.inspect_err(|e| {
                error!(%document_id, error = %e, "embedding failed during ingestion");
            })?;

        let units: Vec<Unit> = texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(sequence_index, (text, embedding))| Unit {
                document_id: document_id.clone(),
                sequence_index,
                text,
                embedding,
            })
            .collect();

        self.vector_store.upsert(&document_id, &units).await.inspect_err(|e| {
            error!(%document_id, error = %e, "upsert failed during ingestion");
        })?;

        info!(%document_id, unit_count = units.len(), "ingested document");
        Ok(document_id)
    }

    /// Answer a question against a previously ingested document:
    /// embed (query mode) → retrieve top-k → synthesize.
    ///
    /// When retrieval returns no context (unknown document or no relevant
    /// units), the pipeline short-circuits with [`NO_RELEVANT_CONTENT`]
    /// instead of asking the synthesizer to answer without grounding.
    pub async fn get_answer(&self, question: &str, document_id: &str) -> Result<String> {
        let embeddings =
            self.embedding_client.embed(&[question], EmbeddingMode::Query).await.inspect_err(
                |e| {
                    error!(error = %e, "embedding failed during query");
                },
            )?;
        let query_embedding = embeddings.into_iter().next().ok_or_else(|| {
            QaError::Pipeline("embedding client returned no vector for the question".to_string())
        })?;

        let matches = self
            .vector_store
            .query(document_id, &query_embedding, self.config.top_k)
            .await
            .inspect_err(|e| {
                error!(document_id, error = %e, "vector store query failed");
            })?;

        if matches.is_empty() {
            info!(document_id, "no context retrieved, short-circuiting");
            return Ok(NO_RELEVANT_CONTENT.to_string());
        }

        let context: Vec<String> = matches.into_iter().map(|m| m.text).collect();
        let answer = self.synthesizer.synthesize(question, &context).await.inspect_err(|e| {
            error!(document_id, error = %e, "answer synthesis failed");
        })?;

        info!(document_id, "answered question");
        Ok(answer)
    }

    /// Check whether a document has indexed units.
    ///
    /// Delegates to the store's sequence-0 probe; a zero-chunk document
    /// reports `false`.
    pub async fn exists(&self, document_id: &str) -> Result<bool> {
        self.vector_store.exists(document_id).await
    }

    /// Delete all of a document's units.
    ///
    /// True removal: a subsequent [`exists`](Self::exists) returns `false`.
    /// Deleting a document that never existed is a successful no-op.
    pub async fn delete_document(&self, document_id: &str) -> Result<()> {
        self.vector_store.delete(document_id).await?;
        info!(document_id, "deleted document");
        Ok(())
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// The embedding client, vector store, and synthesizer are required. The
/// config defaults to [`QaConfig::default()`], and the chunker defaults to a
/// [`SentenceChunker`] sized from the config's `max_unit_sentences` and
/// `max_unit_chars`.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<QaConfig>,
    chunker: Option<Arc<dyn Chunker>>,
    embedding_client: Option<Arc<dyn EmbeddingClient>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    synthesizer: Option<Arc<dyn AnswerSynthesizer>>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: QaConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the document chunker, overriding the config-sized default.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set the embedding client.
    pub fn embedding_client(mut self, client: Arc<dyn EmbeddingClient>) -> Self {
        self.embedding_client = Some(client);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the answer synthesizer.
    pub fn synthesizer(mut self, synthesizer: Arc<dyn AnswerSynthesizer>) -> Self {
        self.synthesizer = Some(synthesizer);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields are
    /// set and that the embedding client's dimensionality matches the
    /// configured index dimensionality.
    ///
    /// When no chunker was injected, a [`SentenceChunker`] is constructed
    /// from the config's unit-sizing fields.
    ///
    /// # Errors
    ///
    /// Returns [`QaError::Config`] if a required field is missing or the
    /// dimensions disagree.
    pub fn build(self) -> Result<QaPipeline> {
        let config = self.config.unwrap_or_default();
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(SentenceChunker::new(config.max_unit_sentences, config.max_unit_chars))
        });
        let embedding_client = self
            .embedding_client
            .ok_or_else(|| QaError::Config("embedding_client is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| QaError::Config("vector_store is required".to_string()))?;
        let synthesizer = self
            .synthesizer
            .ok_or_else(|| QaError::Config("synthesizer is required".to_string()))?;

        if embedding_client.dimensions() != config.dimensions {
            return Err(QaError::Config(format!(
                "embedding client produces {}-dimensional vectors but the index expects {}",
                embedding_client.dimensions(),
                config.dimensions
            )));
        }

        Ok(QaPipeline { config, chunker, embedding_client, vector_store, synthesizer })
    }
}
