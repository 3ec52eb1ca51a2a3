// file: src/provider/fake.rs
// description: deterministic in-process models for tests

use crate::error::{PipelineError, Result};
use crate::provider::{ApiKey, ChatModel, EmbeddingModel, ModelConnector, ModelHandles};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Bag-of-words embedding: each lowercase token bumps one hashed bucket.
pub(crate) struct HashingEmbedder {
    dim: usize,
    pub calls: AtomicUsize,
    pub batch_sizes: Mutex<Vec<usize>>,
}

impl HashingEmbedder {
    pub(crate) fn new(dim: usize) -> Self {
        Self {
            dim,
            calls: AtomicUsize::new(0),
            batch_sizes: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn embed_text(text: &str, dim: usize) -> Vec<f32> {
        let mut vector = vec![0.0; dim];
        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = token
                .to_lowercase()
                .bytes()
                .fold(0xcbf29ce484222325u64, |acc, b| {
                    (acc ^ b as u64).wrapping_mul(0x100000001b3)
                });
            vector[(hash % dim as u64) as usize] += 1.0;
        }
        vector
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EmbeddingModel for HashingEmbedder {
    async fn embed_batch(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.batch_sizes.lock().unwrap().push(inputs.len());
        Ok(inputs
            .iter()
            .map(|text| Self::embed_text(text, self.dim))
            .collect())
    }

    fn model_name(&self) -> &str {
        "hashing-test"
    }
}

/// Embedder that always fails, for error propagation tests.
pub(crate) struct FailingEmbedder;

#[async_trait]
impl EmbeddingModel for FailingEmbedder {
    async fn embed_batch(&self, _inputs: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(PipelineError::Embedding("connection reset".to_string()))
    }

    fn model_name(&self) -> &str {
        "failing-test"
    }
}

/// Replays queued responses and records every prompt it receives.
pub(crate) struct ScriptedChat {
    responses: Mutex<Vec<Result<String>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedChat {
    pub(crate) fn new(responses: Vec<Result<String>>) -> Self {
        let mut responses = responses;
        responses.reverse();
        Self {
            responses: Mutex::new(responses),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn answering(text: &str) -> Self {
        Self::new(vec![Ok(text.to_string())])
    }

    pub(crate) fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatModel for ScriptedChat {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.responses
            .lock()
            .unwrap()
            .pop()
            .unwrap_or_else(|| Err(PipelineError::Generation("no scripted response".to_string())))
    }

    fn model_name(&self) -> &str {
        "scripted-test"
    }
}

/// Connector that accepts one key and hands out the given fakes.
pub(crate) struct FakeConnector {
    pub valid_key: String,
    pub embedder: Arc<HashingEmbedder>,
    pub chat: Arc<ScriptedChat>,
    pub connects: AtomicUsize,
}

impl FakeConnector {
    pub(crate) fn new(valid_key: &str, embedder: Arc<HashingEmbedder>, chat: Arc<ScriptedChat>) -> Self {
        Self {
            valid_key: valid_key.to_string(),
            embedder,
            chat,
            connects: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ModelConnector for FakeConnector {
    async fn connect(&self, credential: &ApiKey) -> Result<ModelHandles> {
        self.connects.fetch_add(1, Ordering::SeqCst);
        if credential.expose() != self.valid_key {
            return Err(PipelineError::InvalidCredential(
                "Incorrect API key provided".to_string(),
            ));
        }
        Ok(ModelHandles {
            embedder: self.embedder.clone(),
            chat: self.chat.clone(),
        })
    }
}
