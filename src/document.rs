//! Data types for retrievable units and query matches.

use serde::{Deserialize, Serialize};

/// Build the deterministic identity key for a unit.
///
/// The key is `{document_id}_{sequence_index}`. Re-ingesting the same
/// document with the same chunking reproduces the same keys, which is what
/// makes upserts overwrite instead of accumulate.
pub fn unit_identity(document_id: &str, sequence_index: usize) -> String {
    format!("{document_id}_{sequence_index}")
}

/// The atomic retrievable item: one chunk of a document with its embedding.
///
/// A document has no standalone stored record; it exists implicitly as the
/// set of units sharing a `document_id`. `sequence_index` is zero-based,
/// contiguous, and insertion-ordered within a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Unit {
    /// The ID of the document this unit belongs to.
    pub document_id: String,
    /// Zero-based position of this unit within its document.
    pub sequence_index: usize,
    /// The text content of the unit.
    pub text: String,
    /// The embedding vector for this unit's text.
    pub embedding: Vec<f32>,
}

impl Unit {
    /// Return this unit's identity key (`{document_id}_{sequence_index}`).
    pub fn identity(&self) -> String {
        unit_identity(&self.document_id, self.sequence_index)
    }
}

/// A retrieved unit paired with its similarity score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryMatch {
    /// The identity key of the matched unit.
    pub id: String,
    /// The text content of the matched unit.
    pub text: String,
    /// The cosine similarity score (higher is more relevant).
    pub score: f32,
}
