// file: src/index/indexer.rs
// description: embeds page records in as few batch calls as the provider allows
// reference: https://platform.openai.com/docs/api-reference/embeddings/create

use crate::config::ProviderConfig;
use crate::error::{PipelineError, Result};
use crate::index::vector::Index;
use crate::models::PageRecord;
use crate::provider::EmbeddingModel;
use tracing::{debug, info};

pub struct Indexer {
    batch_size: usize,
    expected_dimension: Option<usize>,
}

impl Indexer {
    pub fn new(config: &ProviderConfig) -> Self {
        Self {
            batch_size: config.embedding_batch_size.max(1),
            expected_dimension: config.expected_dimension,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Number of embedding requests needed for `inputs` texts.
    pub fn batch_count(&self, inputs: usize) -> usize {
        inputs.div_ceil(self.batch_size)
    }

    /// Embeds every non-empty page and returns the finished index.
    ///
    /// Empty pages stay in the index for page alignment but are not embedded,
    /// so they can never be retrieved or cited.
    pub async fn build(
        &self,
        pages: Vec<PageRecord>,
        embedder: &dyn EmbeddingModel,
    ) -> Result<Index> {
        let (page_numbers, texts): (Vec<usize>, Vec<String>) = pages
            .iter()
            .filter(|page| !page.is_empty())
            .map(|page| (page.page_number(), page.text().to_string()))
            .unzip();

        let skipped = pages.len() - texts.len();
        if skipped > 0 {
            info!("Skipping {} pages without extractable text", skipped);
        }

        info!(
            "Embedding {} pages with {} in {} request(s)",
            texts.len(),
            embedder.model_name(),
            self.batch_count(texts.len())
        );

        let mut vectors = Vec::with_capacity(texts.len());
        for (batch_number, batch) in texts.chunks(self.batch_size).enumerate() {
            debug!("Embedding batch {} ({} pages)", batch_number + 1, batch.len());

            let embedded = embedder.embed_batch(batch).await?;
            if embedded.len() != batch.len() {
                return Err(PipelineError::Embedding(format!(
                    "sent {} pages for embedding, received {} vectors",
                    batch.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
        }

        if let (Some(expected), Some(actual)) = (self.expected_dimension, vectors.first())
            && actual.len() != expected
        {
            return Err(PipelineError::Embedding(format!(
                "embedding model returned dimension {}, expected {}",
                actual.len(),
                expected
            )));
        }

        let index = Index::new(pages, page_numbers.into_iter().zip(vectors).collect())?;

        info!(
            "Indexed {} of {} pages (dimension {})",
            index.len(),
            index.pages().len(),
            index.dimension()
        );
        Ok(index)
    }
}

impl Default for Indexer {
    fn default() -> Self {
        Self {
            batch_size: 2048,
            expected_dimension: None,
        }
    }
}
