// file: src/provider/chat.rs
// description: OpenAI chat completions endpoint integration
// reference: https://platform.openai.com/docs/api-reference/chat

use crate::error::{PipelineError, Result};
use crate::provider::{ChatModel, OpenAiClient};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.config().chat_model,
            temperature: self.config().temperature,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
        };

        debug!(
            "Requesting completion from {} ({} prompt chars)",
            self.config().chat_model,
            prompt.len()
        );

        let response: ChatResponse = self
            .post_json("chat/completions", &request, PipelineError::Generation)
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                PipelineError::Generation("provider returned no completion text".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.config().chat_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ApiKey;
    use crate::provider::client::tests::test_provider_config;

    #[tokio::test]
    async fn test_complete_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_body(mockito::Matcher::PartialJsonString(
                r#"{"model":"gpt-4-turbo-preview","temperature":0.0}"#.to_string(),
            ))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"choices":[{"index":0,"message":{"role":"assistant","content":" Bananas are yellow. "}}]}"#,
            )
            .create_async()
            .await;

        let client = OpenAiClient::new(
            ApiKey::parse("sk-test").unwrap(),
            test_provider_config(server.url()),
        )
        .unwrap();

        let answer = client.complete("What color are bananas?").await.unwrap();
        assert_eq!(answer, "Bananas are yellow.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rate_limit_is_generation_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(429)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(
            ApiKey::parse("sk-test").unwrap(),
            test_provider_config(server.url()),
        )
        .unwrap();

        let err = client.complete("hello").await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
        assert!(err.to_string().contains("Rate limit reached"));
    }

    #[tokio::test]
    async fn test_missing_content_is_generation_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(
            ApiKey::parse("sk-test").unwrap(),
            test_provider_config(server.url()),
        )
        .unwrap();

        assert!(matches!(
            client.complete("hello").await,
            Err(PipelineError::Generation(_))
        ));
    }
}
