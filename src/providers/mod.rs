//! HTTP adapters for concrete embedding and vector-store services.
//!
//! Each adapter translates the provider's wire shapes into the crate's
//! typed structures at the boundary, so the rest of the pipeline never sees
//! provider-specific response formats.

pub mod cohere;
pub mod pinecone;

pub use cohere::CohereEmbeddingClient;
pub use pinecone::PineconeVectorStore;
