//! # docqa
//!
//! Retrieval-augmented question answering over uploaded documents.
//!
//! A document is chunked into sentence-level units, embedded, and indexed
//! in a vector store; questions are answered by embedding the question,
//! retrieving the most relevant units, and synthesizing an answer from
//! them.
//!
//! ## Overview
//!
//! The pipeline composes four injected collaborators behind narrow traits:
//!
//! - [`Chunker`] — splits document text into ordered units
//! - [`EmbeddingClient`] — turns texts into fixed-dimension vectors,
//!   distinguishing document and query intent
//! - [`VectorStore`] — persists `(unit_id, vector, metadata)` records with
//!   document-scoped query, existence, and delete operations
//! - [`AnswerSynthesizer`] — produces an answer from a question and
//!   retrieved context
//!
//! HTTP adapters for concrete services live in [`providers`];
//! [`InMemoryVectorStore`] backs tests and development.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! use docqa::providers::{CohereEmbeddingClient, PineconeVectorStore};
//! use docqa::{ChatSynthesizer, QaConfig, QaPipeline};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(QaConfig::default())
//!     .embedding_client(Arc::new(CohereEmbeddingClient::from_env()?))
//!     .vector_store(Arc::new(PineconeVectorStore::from_env()?))
//!     .synthesizer(Arc::new(ChatSynthesizer::from_env()?))
//!     .build()?;
//!
//! pipeline.ensure_index().await?;
//! let document_id = pipeline.add_document(Path::new("guide.pdf")).await?;
//! let answer = pipeline.get_answer("What does the guide cover?", &document_id).await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod inmemory;
pub mod pipeline;
pub mod providers;
pub mod synthesis;
pub mod vectorstore;

pub use chunking::{Chunker, SentenceChunker, extract_text};
pub use config::{QaConfig, QaConfigBuilder};
pub use document::{QueryMatch, Unit, unit_identity};
pub use embedding::{EmbeddingClient, EmbeddingMode};
pub use error::{QaError, Result};
pub use inmemory::InMemoryVectorStore;
pub use pipeline::{NO_RELEVANT_CONTENT, QaPipeline, QaPipelineBuilder};
pub use synthesis::{AnswerSynthesizer, ChatSynthesizer, compose_prompt};
pub use vectorstore::VectorStore;
