//! Vector store trait for indexing and retrieving units.

use async_trait::async_trait;

use crate::document::{QueryMatch, Unit};
use crate::error::Result;

/// A storage backend for embedded units with document-scoped retrieval.
///
/// The store exclusively owns persisted unit records; pipeline components
/// hold no durable state. Records are keyed by the deterministic unit
/// identity `{document_id}_{sequence_index}`, so re-ingesting a document
/// overwrites its units in place.
///
/// All operations wrap upstream failures into
/// [`QaError::VectorStore`](crate::QaError::VectorStore) carrying the
/// operation name; raw provider errors never leak past this boundary.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Ensure the backing index exists, creating it if necessary.
    ///
    /// Idempotent; intended to be called once at bootstrap rather than as a
    /// per-request side effect.
    async fn ensure_index(&self) -> Result<()>;

    /// Write or overwrite unit records keyed by their identity.
    ///
    /// Large batches are split into provider-limited sub-batches (100
    /// records for remote backends) and issued sequentially. A failure
    /// partway through leaves the document partially indexed: writes are
    /// at-least-once and non-transactional, and are not rolled back.
    async fn upsert(&self, document_id: &str, units: &[Unit]) -> Result<()>;

    /// Similarity search restricted to one document.
    ///
    /// Returns at most `top_k` matches ranked by cosine similarity
    /// descending. An empty result is valid, not an error.
    async fn query(&self, document_id: &str, embedding: &[f32], top_k: usize)
    -> Result<Vec<QueryMatch>>;

    /// Check whether a document has indexed units.
    ///
    /// Probes the known identity of the first unit (`{document_id}_0`)
    /// rather than scanning. A successfully ingested document always has a
    /// unit at sequence 0, so this is sufficient — with the documented
    /// consequence that a zero-chunk document is indistinguishable from a
    /// non-existent one.
    async fn exists(&self, document_id: &str) -> Result<bool>;

    /// Delete all units belonging to a document.
    ///
    /// Resolves the full identity set via a broad document-filtered query,
    /// then deletes the resolved identities in one bulk call. No-op if the
    /// document has no indexed units. Not atomic with respect to a
    /// concurrent ingestion of the same document.
    async fn delete(&self, document_id: &str) -> Result<()>;
}
