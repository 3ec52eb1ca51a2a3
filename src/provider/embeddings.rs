// file: src/provider/embeddings.rs
// description: OpenAI embeddings endpoint integration with batched input
// reference: https://platform.openai.com/docs/api-reference/embeddings

use crate::error::{PipelineError, Result};
use crate::provider::{EmbeddingModel, OpenAiClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

#[async_trait]
impl EmbeddingModel for OpenAiClient {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let request = EmbeddingRequest {
            input: inputs,
            model: &self.config().embedding_model,
        };

        debug!(
            "Requesting {} embeddings from {}",
            inputs.len(),
            self.config().embedding_model
        );

        let response: EmbeddingResponse = self
            .post_json("embeddings", &request, PipelineError::Embedding)
            .await?;

        if response.data.len() != inputs.len() {
            return Err(PipelineError::Embedding(format!(
                "requested {} embeddings, provider returned {}",
                inputs.len(),
                response.data.len()
            )));
        }

        // The API tags each vector with its input position; don't rely on array order.
        let mut data = response.data;
        data.sort_by_key(|item| item.index);

        if let Some(first) = data.first() {
            debug!("Received embeddings of dimension {}", first.embedding.len());
        }

        Ok(data.into_iter().map(|item| item.embedding).collect())
    }

    fn model_name(&self) -> &str {
        &self.config().embedding_model
    }
}
