// file: src/answer/mod.rs
// description: answer generation and citation module exports
// reference: internal module structure

pub mod citation;
pub mod prompt;
pub mod synthesizer;

pub use citation::CitationFormatter;
pub use prompt::PromptTemplate;
pub use synthesizer::{AnswerSynthesizer, CONTEXT_SEPARATOR};
