// file: src/index/mod.rs
// description: per-document similarity index, its builder and its query path
// reference: internal module structure

pub mod indexer;
pub mod retriever;
pub mod vector;

pub use indexer::Indexer;
pub use retriever::Retriever;
pub use vector::Index;
