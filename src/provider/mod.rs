// file: src/provider/mod.rs
// description: model provider seams for embeddings and chat completion
// reference: https://platform.openai.com/docs/api-reference

pub mod chat;
pub mod client;
pub mod credential;
pub mod embeddings;

use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use std::sync::Arc;

pub use client::{OpenAiClient, OpenAiConnector};
pub use credential::ApiKey;

/// Text to fixed-length vector. Implementations must return one vector per
/// input, in input order.
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>>;

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        if vectors.len() != 1 {
            return Err(PipelineError::Embedding(format!(
                "expected 1 embedding, provider returned {}",
                vectors.len()
            )));
        }
        Ok(vectors.remove(0))
    }

    fn model_name(&self) -> &str;
}

/// Prompt to completion text.
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;

    fn model_name(&self) -> &str;
}

/// Models bound to one credential.
#[derive(Clone)]
pub struct ModelHandles {
    pub embedder: Arc<dyn EmbeddingModel>,
    pub chat: Arc<dyn ChatModel>,
}

/// Turns a credential into ready-to-use models, rejecting bad credentials
/// before any document work starts.
#[async_trait]
pub trait ModelConnector: Send + Sync {
    async fn connect(&self, credential: &ApiKey) -> Result<ModelHandles>;
}

#[cfg(test)]
pub(crate) mod fake;
