//! In-memory vector store using cosine similarity.
//!
//! This module provides [`InMemoryVectorStore`], a zero-dependency store
//! backed by a `HashMap` protected by a `tokio::sync::RwLock`. It is
//! suitable for development and testing, and deliberately preserves the
//! same contracts as the remote backends — including the sequence-0
//! existence probe — so tests against it exercise the real semantics.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{QueryMatch, Unit, unit_identity};
use crate::error::{QaError, Result};
use crate::vectorstore::VectorStore;

const BACKEND: &str = "in-memory";

/// An in-memory [`VectorStore`] using cosine similarity for search.
///
/// Units are stored in a single map keyed by unit identity; document
/// scoping is enforced by filtering on the stored `document_id`, mirroring
/// how remote backends filter on metadata.
#[derive(Debug)]
pub struct InMemoryVectorStore {
    dimensions: usize,
    units: RwLock<HashMap<String, Unit>>,
}

impl InMemoryVectorStore {
    /// Create a new empty store expecting embeddings of `dimensions`.
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions, units: RwLock::new(HashMap::new()) }
    }

    fn check_dimensions(&self, got: usize, operation: &str) -> Result<()> {
        if got != self.dimensions {
            return Err(QaError::VectorStore {
                backend: BACKEND.to_string(),
                operation: operation.to_string(),
                message: format!(
                    "embedding dimension mismatch: index expects {}, got {got}",
                    self.dimensions
                ),
            });
        }
        Ok(())
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn ensure_index(&self) -> Result<()> {
        Ok(())
    }

    async fn upsert(&self, document_id: &str, units: &[Unit]) -> Result<()> {
        for unit in units {
            self.check_dimensions(unit.embedding.len(), "upsert")?;
            if unit.document_id != document_id {
                return Err(QaError::VectorStore {
                    backend: BACKEND.to_string(),
                    operation: "upsert".to_string(),
                    message: format!(
                        "unit '{}' does not belong to document '{document_id}'",
                        unit.identity()
                    ),
                });
            }
        }

        let mut store = self.units.write().await;
        for unit in units {
            store.insert(unit.identity(), unit.clone());
        }
        Ok(())
    }

    async fn query(
        &self,
        document_id: &str,
        embedding: &[f32],
        top_k: usize,
    ) -> Result<Vec<QueryMatch>> {
        self.check_dimensions(embedding.len(), "query")?;

        let store = self.units.read().await;
        let mut matches: Vec<QueryMatch> = store
            .values()
            .filter(|unit| unit.document_id == document_id)
            .map(|unit| QueryMatch {
                id: unit.identity(),
                text: unit.text.clone(),
                score: cosine_similarity(&unit.embedding, embedding),
            })
            .collect();

        matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        matches.truncate(top_k);
        Ok(matches)
    }

    async fn exists(&self, document_id: &str) -> Result<bool> {
        let store = self.units.read().await;
        Ok(store.contains_key(&unit_identity(document_id, 0)))
    }

    async fn delete(&self, document_id: &str) -> Result<()> {
        let mut store = self.units.write().await;
        // Resolve the identity set first, then remove in bulk, matching the
        // remote backends' resolve-then-delete shape.
        let ids: Vec<String> = store
            .iter()
            .filter(|(_, unit)| unit.document_id == document_id)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &ids {
            store.remove(id);
        }
        Ok(())
    }
}
