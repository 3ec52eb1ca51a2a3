// file: src/index/vector.rs
// description: in-memory vector index with exact cosine search
// reference: https://en.wikipedia.org/wiki/Cosine_similarity

use crate::error::{PipelineError, Result};
use crate::models::{PageRecord, RetrievalResult, ScoredPage};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, PartialEq)]
struct IndexEntry {
    page_number: usize,
    vector: Vec<f32>,
    norm: f32,
}

/// Pages of one uploaded document plus the embeddings of its non-empty pages.
///
/// Immutable once built, so a single `Index` can be shared across readers.
#[derive(Debug, Clone)]
pub struct Index {
    source_name: String,
    pages: Vec<PageRecord>,
    entries: Vec<IndexEntry>,
    dimension: usize,
    fingerprint: String,
}

impl Index {
    /// `embedded` pairs page numbers with vectors in insertion order. Every
    /// vector must share one dimension, and `pages[i]` must be page `i`.
    pub(crate) fn new(pages: Vec<PageRecord>, embedded: Vec<(usize, Vec<f32>)>) -> Result<Self> {
        let source_name = pages
            .first()
            .map(|page| page.source_name().to_string())
            .unwrap_or_default();

        if let Some(other) = pages.iter().find(|p| p.source_name() != source_name) {
            return Err(PipelineError::Validation(format!(
                "index holds a single document, found pages from {} and {}",
                source_name,
                other.source_name()
            )));
        }

        if let Some((position, page)) = pages
            .iter()
            .enumerate()
            .find(|(position, page)| page.page_number() != *position)
        {
            return Err(PipelineError::Validation(format!(
                "page at position {} is numbered {}; pages must be contiguous and in order",
                position,
                page.page_number()
            )));
        }

        let dimension = embedded.first().map(|(_, v)| v.len()).unwrap_or(0);
        let mut entries = Vec::with_capacity(embedded.len());

        for (page_number, vector) in embedded {
            if vector.is_empty() || vector.len() != dimension {
                return Err(PipelineError::Embedding(format!(
                    "page {} has embedding dimension {}, expected {}",
                    page_number,
                    vector.len(),
                    dimension
                )));
            }
            if page_number >= pages.len() {
                return Err(PipelineError::Validation(format!(
                    "embedding refers to page {} but the document has {} pages",
                    page_number,
                    pages.len()
                )));
            }

            let norm = l2_norm(&vector);
            entries.push(IndexEntry {
                page_number,
                vector,
                norm,
            });
        }

        let fingerprint = fingerprint(&pages);

        Ok(Self {
            source_name,
            pages,
            entries,
            dimension,
            fingerprint,
        })
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// All pages, including the ones that were never embedded.
    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn page(&self, page_number: usize) -> Option<&PageRecord> {
        self.pages.get(page_number)
    }

    /// Number of searchable (embedded) pages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// SHA-256 over the source name and page texts.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn vectors(&self) -> impl Iterator<Item = (usize, &[f32])> {
        self.entries
            .iter()
            .map(|entry| (entry.page_number, entry.vector.as_slice()))
    }

    /// Exact top-k by cosine similarity; equal scores keep the lower page first.
    pub fn search(&self, query_vector: &[f32], k: usize) -> Result<RetrievalResult> {
        if self.entries.is_empty() || k == 0 {
            return Ok(RetrievalResult::default());
        }

        if query_vector.len() != self.dimension {
            return Err(PipelineError::Embedding(format!(
                "query embedding has dimension {}, index has {}",
                query_vector.len(),
                self.dimension
            )));
        }

        let query_norm = l2_norm(query_vector);

        let mut scored: Vec<(f32, usize)> = self
            .entries
            .iter()
            .map(|entry| {
                let score = cosine(query_vector, query_norm, &entry.vector, entry.norm);
                (score, entry.page_number)
            })
            .collect();

        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(k);

        let hits = scored
            .into_iter()
            .map(|(score, page_number)| ScoredPage {
                page: self.pages[page_number].clone(),
                score,
            })
            .collect();

        Ok(RetrievalResult::new(hits))
    }
}

/// Zero-norm vectors score 0.0 against everything.
fn cosine(a: &[f32], norm_a: f32, b: &[f32], norm_b: f32) -> f32 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn fingerprint(pages: &[PageRecord]) -> String {
    let mut hasher = Sha256::new();
    if let Some(first) = pages.first() {
        hasher.update(first.source_name().as_bytes());
    }
    for page in pages {
        hasher.update((page.page_number() as u64).to_le_bytes());
        hasher.update((page.text().len() as u64).to_le_bytes());
        hasher.update(page.text().as_bytes());
    }
    format!("{:x}", hasher.finalize())
}
