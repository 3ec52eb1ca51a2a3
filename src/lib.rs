// file: src/lib.rs
// description: library entry point and public api exports
// reference: rust library patterns
#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/readme.md"))]

pub mod answer;
pub mod config;
pub mod error;
pub mod index;
pub mod models;
pub mod parser;
pub mod pipeline;
pub mod provider;
pub mod utils;

pub use answer::{AnswerSynthesizer, CitationFormatter, PromptTemplate};
pub use config::{Config, LoaderConfig, PromptConfig, ProviderConfig, RetrievalConfig};
pub use error::{ErrorKind, PipelineError, Result};
pub use index::{Index, Indexer, Retriever};
pub use models::{AnswerEnvelope, PageRecord, RetrievalResult, ScoredPage};
pub use parser::{PdfLoader, TextNormalizer};
pub use pipeline::{IndexingStats, Pipeline, PipelineState, ProgressSpinner, Upload};
pub use provider::{
    ApiKey, ChatModel, EmbeddingModel, ModelConnector, ModelHandles, OpenAiClient,
    OpenAiConnector,
};
pub use utils::{OperationTimer, PerformanceMetrics, Validator};
