// file: src/models/search_result.rs
// description: retrieval results with similarity scores
// reference: Used for vector similarity search results

use crate::models::PageRecord;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredPage {
    pub page: PageRecord,

    /// Cosine similarity to the query (higher is more similar, -1.0..=1.0)
    pub score: f32,
}

/// Retrieved pages ordered by descending score, ties broken by lower page number.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredPage>,
}

impl RetrievalResult {
    pub fn new(hits: Vec<ScoredPage>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn hits(&self) -> &[ScoredPage] {
        &self.hits
    }

    pub fn pages(&self) -> impl Iterator<Item = &PageRecord> {
        self.hits.iter().map(|hit| &hit.page)
    }

    pub fn page_numbers(&self) -> Vec<usize> {
        self.pages().map(PageRecord::page_number).collect()
    }

    /// One block per hit for debug logs: score, page, and a text preview.
    pub fn format_summary(&self, max_content_len: usize) -> String {
        self.hits
            .iter()
            .map(|hit| {
                format!(
                    "Score: {:.4} | page {} ({})\n{}\n",
                    hit.score,
                    hit.page.page_number(),
                    hit.page.source_name(),
                    crate::utils::Validator::truncate_text(hit.page.text(), max_content_len)
                )
            })
            .collect()
    }
}
