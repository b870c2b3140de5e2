//! Qdrant-backed Archival Storage for the hearth agent runtime (spec §4.1).

pub mod chunker;
pub mod embedding;
pub mod error;
pub mod qdrant_store;

pub use chunker::split_into_chunks;
pub use error::RagError;
pub use qdrant_store::QdrantVectorStore;
