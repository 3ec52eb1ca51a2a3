// file: src/models/mod.rs
// description: data models module exports
// reference: internal module structure

pub mod answer;
pub mod page;
pub mod search_result;

pub use answer::AnswerEnvelope;
pub use page::PageRecord;
pub use search_result::{RetrievalResult, ScoredPage};
