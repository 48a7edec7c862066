//! Contract and property tests for the in-memory vector store.

use docqa::document::{Unit, unit_identity};
use docqa::inmemory::InMemoryVectorStore;
use docqa::vectorstore::VectorStore;
use proptest::prelude::*;

const DIM: usize = 16;

fn unit(document_id: &str, sequence_index: usize, text: &str, embedding: Vec<f32>) -> Unit {
    Unit { document_id: document_id.to_string(), sequence_index, text: text.to_string(), embedding }
}

#[tokio::test]
async fn exists_probes_sequence_zero_only() {
    let store = InMemoryVectorStore::new(DIM);
    // A document whose sequence-0 unit is missing does not "exist", even
    // though it has indexed units. This locks in the probe shortcut.
    store.upsert("gap", &[unit("gap", 1, "late unit", vec![1.0; DIM])]).await.unwrap();
    assert!(!store.exists("gap").await.unwrap());

    store.upsert("gap", &[unit("gap", 0, "first unit", vec![1.0; DIM])]).await.unwrap();
    assert!(store.exists("gap").await.unwrap());
}

#[tokio::test]
async fn upsert_overwrites_by_identity() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("doc", &[unit("doc", 0, "old text", vec![1.0; DIM])]).await.unwrap();
    store.upsert("doc", &[unit("doc", 0, "new text", vec![1.0; DIM])]).await.unwrap();

    let matches = store.query("doc", &vec![1.0; DIM], 10).await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].id, unit_identity("doc", 0));
    assert_eq!(matches[0].text, "new text");
}

#[tokio::test]
async fn dimension_mismatch_is_a_hard_failure() {
    let store = InMemoryVectorStore::new(DIM);
    let err = store.upsert("doc", &[unit("doc", 0, "short", vec![1.0; DIM - 1])]).await.unwrap_err();
    assert!(matches!(err, docqa::QaError::VectorStore { .. }));

    let err = store.query("doc", &vec![1.0; DIM + 1], 3).await.unwrap_err();
    assert!(matches!(err, docqa::QaError::VectorStore { .. }));
}

#[tokio::test]
async fn query_on_empty_document_returns_empty() {
    let store = InMemoryVectorStore::new(DIM);
    let matches = store.query("missing", &vec![1.0; DIM], 3).await.unwrap();
    assert!(matches.is_empty());
}

#[tokio::test]
async fn delete_is_scoped_to_one_document() {
    let store = InMemoryVectorStore::new(DIM);
    store.upsert("keep", &[unit("keep", 0, "kept", vec![1.0; DIM])]).await.unwrap();
    store.upsert("drop", &[unit("drop", 0, "dropped", vec![1.0; DIM])]).await.unwrap();

    store.delete("drop").await.unwrap();

    assert!(store.exists("keep").await.unwrap());
    assert!(!store.exists("drop").await.unwrap());
}

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map("non-zero embedding", |mut v| {
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm < 1e-8 {
            return None;
        }
        for val in &mut v {
            *val /= norm;
        }
        Some(v)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// For any set of units stored under one document, a query returns
    /// results ordered by descending cosine similarity, bounded by `top_k`
    /// and by the number of stored units.
    #[test]
    fn query_results_ordered_descending_and_bounded(
        embeddings in proptest::collection::vec(arb_normalized_embedding(DIM), 1..20),
        query in arb_normalized_embedding(DIM),
        top_k in 1usize..25,
    ) {
        let rt = tokio::runtime::Runtime::new().unwrap();
        let (matches, stored) = rt.block_on(async {
            let store = InMemoryVectorStore::new(DIM);
            let units: Vec<Unit> = embeddings
                .iter()
                .enumerate()
                .map(|(i, e)| unit("doc", i, &format!("unit {i}"), e.clone()))
                .collect();
            store.upsert("doc", &units).await.unwrap();
            let matches = store.query("doc", &query, top_k).await.unwrap();
            (matches, units.len())
        });

        prop_assert!(matches.len() <= top_k);
        prop_assert!(matches.len() <= stored);
        for window in matches.windows(2) {
            prop_assert!(
                window[0].score >= window[1].score,
                "results not in descending order: {} < {}",
                window[0].score,
                window[1].score,
            );
        }
    }
}
