// file: src/answer/citation.rs
// description: appends source file and page references to an answer

use crate::error::{PipelineError, Result};
use crate::models::{AnswerEnvelope, RetrievalResult};

#[derive(Debug, Default, Clone, Copy)]
pub struct CitationFormatter;

impl CitationFormatter {
    pub fn new() -> Self {
        Self
    }

    pub fn format(
        &self,
        answer_text: &str,
        retrieved: &RetrievalResult,
        source_name: &str,
    ) -> Result<AnswerEnvelope> {
        if let Some(foreign) = retrieved.pages().find(|p| p.source_name() != source_name) {
            return Err(PipelineError::Validation(format!(
                "retrieved page {} belongs to {}, not {}",
                foreign.page_number(),
                foreign.source_name(),
                source_name
            )));
        }

        let mut cited_pages: Vec<usize> = Vec::with_capacity(retrieved.len());
        for page_number in retrieved.page_numbers() {
            if !cited_pages.contains(&page_number) {
                cited_pages.push(page_number);
            }
        }

        let answer_text = if cited_pages.is_empty() {
            answer_text.to_string()
        } else {
            format!(
                "{}{}",
                answer_text,
                Self::citation_clause(source_name, &cited_pages)
            )
        };

        Ok(AnswerEnvelope {
            answer_text,
            cited_pages,
            source_name: source_name.to_string(),
        })
    }

    pub fn citation_clause(source_name: &str, pages: &[usize]) -> String {
        let pages = pages
            .iter()
            .map(usize::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            " Following pages from {} have additional information for reference: [{}]",
            source_name, pages
        )
    }
}
