// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::answer::PromptTemplate;
use crate::error::{PipelineError, Result};
use crate::utils::Validator;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_PROMPT_TEMPLATE: &str = "\
Make sure to answer the question in English unless the question is in a different language.
Answer the question based only on the following context:
{context}

Question: {question}
";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub provider: ProviderConfig,
    pub retrieval: RetrievalConfig,
    pub loader: LoaderConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    pub api_base: String,
    pub embedding_model: String,
    pub chat_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
    pub embedding_batch_size: usize,
    #[serde(default)]
    pub expected_dimension: Option<usize>,
    #[serde(default)]
    pub max_retries: u8,
    #[serde(default = "default_verify_credential")]
    pub verify_credential: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetrievalConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    pub normalize_text: bool,
    pub max_file_size_mb: usize,
    /// Where uploads are staged for parsing; the system temp dir when unset.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PromptConfig {
    pub template: String,
}

fn default_verify_credential() -> bool {
    true
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let defaults = config::Config::try_from(&Self::default_config())
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(
                config::File::from(Path::new("config/default.toml")).required(false),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix("BOOKWISE")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            provider: ProviderConfig {
                api_base: "https://api.openai.com/v1".to_string(),
                embedding_model: "text-embedding-3-small".to_string(),
                chat_model: "gpt-4-turbo-preview".to_string(),
                temperature: 0.0,
                timeout_secs: 60,
                embedding_batch_size: 2048,
                expected_dimension: None,
                max_retries: 0,
                verify_credential: true,
            },
            retrieval: RetrievalConfig { top_k: 3 },
            loader: LoaderConfig {
                normalize_text: true,
                max_file_size_mb: 50,
                staging_dir: None,
            },
            prompt: PromptConfig {
                template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            },
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.retrieval.top_k == 0 {
            return Err(PipelineError::Config(
                "top_k must be greater than 0".to_string(),
            ));
        }

        if self.provider.embedding_batch_size == 0 {
            return Err(PipelineError::Config(
                "embedding_batch_size must be greater than 0".to_string(),
            ));
        }

        if self.provider.timeout_secs == 0 {
            return Err(PipelineError::Config(
                "timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.provider.max_retries > 1 {
            return Err(PipelineError::Config(
                "max_retries must be 0 or 1".to_string(),
            ));
        }

        if self.provider.expected_dimension == Some(0) {
            return Err(PipelineError::Config(
                "expected_dimension must be greater than 0".to_string(),
            ));
        }

        Validator::validate_url(&self.provider.api_base)
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        PromptTemplate::new(self.prompt.template.as_str())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default_config();
        assert!(config.validate().is_ok());
        assert_eq!(config.retrieval.top_k, 3);
        assert_eq!(config.provider.max_retries, 0);
    }

    #[test]
    fn test_rejects_zero_top_k() {
        let mut config = Config::default_config();
        config.retrieval.top_k = 0;
        assert!(matches!(config.validate(), Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_rejects_more_than_one_retry() {
        let mut config = Config::default_config();
        config.provider.max_retries = 2;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_template_without_placeholders() {
        let mut config = Config::default_config();
        config.prompt.template = "Answer: {question}".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_overrides_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bookwise.toml");
        fs::write(
            &path,
            "[retrieval]\ntop_k = 5\n\n[provider]\nchat_model = \"gpt-4o-mini\"\n",
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.retrieval.top_k, 5);
        assert_eq!(config.provider.chat_model, "gpt-4o-mini");
        assert_eq!(config.provider.embedding_model, "text-embedding-3-small");
    }
}
