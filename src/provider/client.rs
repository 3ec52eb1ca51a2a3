// file: src/provider/client.rs
// description: HTTP client for OpenAI-compatible endpoints with status mapping
// reference: https://platform.openai.com/docs/api-reference/authentication

use crate::config::ProviderConfig;
use crate::error::{PipelineError, Result};
use crate::provider::{ApiKey, ModelConnector, ModelHandles};
use crate::utils::Validator;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

#[derive(Clone)]
pub struct OpenAiClient {
    http: Client,
    api_key: ApiKey,
    config: ProviderConfig,
}

impl OpenAiClient {
    pub fn new(api_key: ApiKey, config: ProviderConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| PipelineError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_key,
            config,
        })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_base.trim_end_matches('/'), path)
    }

    /// Cheap authenticated call used to reject a bad key before indexing.
    pub async fn verify_credential(&self) -> Result<()> {
        debug!("Verifying credential against {}", self.endpoint("models"));

        self.send(
            self.http.get(self.endpoint("models")),
            PipelineError::Embedding,
        )
        .await?;

        info!("Credential accepted by provider");
        Ok(())
    }

    pub(crate) async fn post_json<B, T>(
        &self,
        path: &str,
        body: &B,
        wrap: fn(String) -> PipelineError,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self
            .send(self.http.post(self.endpoint(path)).json(body), wrap)
            .await?;

        response
            .json::<T>()
            .await
            .map_err(|e| wrap(format!("Failed to parse {} response: {}", path, e)))
    }

    async fn send(
        &self,
        request: RequestBuilder,
        wrap: fn(String) -> PipelineError,
    ) -> Result<Response> {
        let response = request
            .bearer_auth(self.api_key.expose())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    wrap(format!(
                        "request timed out after {}s",
                        self.config.timeout_secs
                    ))
                } else {
                    wrap(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        let message = provider_message(&body);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PipelineError::InvalidCredential(message));
        }

        Err(wrap(format!(
            "request failed with status {}: {}",
            status, message
        )))
    }
}

fn provider_message(body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .map(|parsed| parsed.error.message)
        .unwrap_or_else(|_| Validator::truncate_text(body.trim(), 200))
}

/// Connects the OpenAI client for a credential, optionally checking it first.
pub struct OpenAiConnector {
    config: ProviderConfig,
}

impl OpenAiConnector {
    pub fn new(config: ProviderConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ModelConnector for OpenAiConnector {
    async fn connect(&self, credential: &ApiKey) -> Result<ModelHandles> {
        let client = Arc::new(OpenAiClient::new(credential.clone(), self.config.clone())?);

        if self.config.verify_credential {
            client.verify_credential().await?;
        }

        Ok(ModelHandles {
            embedder: client.clone(),
            chat: client,
        })
    }
}
