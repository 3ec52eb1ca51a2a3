// file: src/index/retriever.rs
// description: embeds a question and returns the most similar pages
// reference: internal retrieval flow

use crate::error::Result;
use crate::index::vector::Index;
use crate::models::RetrievalResult;
use crate::provider::EmbeddingModel;
use crate::utils::Validator;
use tracing::{debug, info};

#[derive(Debug, Default, Clone, Copy)]
pub struct Retriever;

impl Retriever {
    pub fn new() -> Self {
        Self
    }

    pub async fn query(
        &self,
        index: &Index,
        query_text: &str,
        k: usize,
        embedder: &dyn EmbeddingModel,
    ) -> Result<RetrievalResult> {
        Validator::validate_query(query_text)?;
        Validator::validate_top_k(k)?;

        if index.is_empty() {
            info!("Index for {} has no searchable pages", index.source_name());
            return Ok(RetrievalResult::default());
        }

        let query_vector = embedder.embed(query_text).await?;
        let result = index.search(&query_vector, k)?;

        debug!(
            "Retrieved pages {:?} for k={} from {}",
            result.page_numbers(),
            k,
            index.source_name()
        );
        Ok(result)
    }
}
