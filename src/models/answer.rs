// file: src/models/answer.rs
// description: final answer with its page citations

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnswerEnvelope {
    /// Model answer followed by the citation clause
    pub answer_text: String,

    /// Distinct page numbers in order of first retrieval
    pub cited_pages: Vec<usize>,

    pub source_name: String,
}

impl AnswerEnvelope {
    pub fn rendered(&self) -> &str {
        &self.answer_text
    }

    pub fn cites(&self, page_number: usize) -> bool {
        self.cited_pages.contains(&page_number)
    }
}
