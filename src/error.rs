// file: src/error.rs
// description: Custom error types and result type aliases
// reference: https://docs.rs/thiserror

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("PDF parsing error: {0}")]
    Parse(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid API Key: {0}")]
    InvalidCredential(String),

    #[error("Query is empty")]
    EmptyQuery,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification shown to whoever drives the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidCredential,
    EmptyQuery,
    Processing,
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::InvalidCredential(_) => ErrorKind::InvalidCredential,
            PipelineError::EmptyQuery => ErrorKind::EmptyQuery,
            _ => ErrorKind::Processing,
        }
    }

    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::InvalidCredential => self.to_string(),
            ErrorKind::EmptyQuery => "Please enter a question.".to_string(),
            ErrorKind::Processing => format!("Processing error: {}", self),
        }
    }

    /// Provider failures that may succeed on a second attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PipelineError::Embedding(_) | PipelineError::Generation(_)
        )
    }
}
