//! Error types for the `docqa` crate.

use thiserror::Error;

/// Errors that can occur in the document question-answering pipeline.
#[derive(Debug, Error)]
pub enum QaError {
    /// A document could not be read or parsed.
    #[error("Document parse error ({path}): {message}")]
    DocumentParse {
        /// The path of the document that failed to parse.
        path: String,
        /// A description of the failure.
        message: String,
    },

    /// The embedding service failed or returned an unusable response.
    #[error("Embedding service error ({provider}): {message}")]
    EmbeddingService {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure, including upstream detail.
        message: String,
    },

    /// A vector store operation failed.
    #[error("Vector store error ({backend}, {operation}): {message}")]
    VectorStore {
        /// The vector store backend that produced the error.
        backend: String,
        /// The store operation that failed (`upsert`, `query`, `exists`, `delete`, `ensure_index`).
        operation: String,
        /// A description of the failure, including upstream detail.
        message: String,
    },

    /// The answer synthesis service failed.
    ///
    /// A valid "I don't know" answer is *not* an error; this variant covers
    /// network and service failures only.
    #[error("Synthesis service error ({provider}): {message}")]
    SynthesisService {
        /// The synthesis provider that produced the error.
        provider: String,
        /// A description of the failure, including upstream detail.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// An error in pipeline orchestration.
    #[error("Pipeline error: {0}")]
    Pipeline(String),
}

/// A convenience result type for pipeline operations.
pub type Result<T> = std::result::Result<T, QaError>;
