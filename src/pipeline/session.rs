// file: src/pipeline/session.rs
// description: per-session state machine wiring loading, indexing, retrieval and answering
// reference: orchestrates the upload then question workflow

use crate::answer::{AnswerSynthesizer, CitationFormatter, PromptTemplate};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::index::{Index, Indexer, Retriever};
use crate::models::AnswerEnvelope;
use crate::parser::PdfLoader;
use crate::pipeline::progress::IndexingStats;
use crate::provider::{ApiKey, ModelConnector, ModelHandles, OpenAiConnector};
use crate::utils::{OperationTimer, Validator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PipelineState {
    Idle,
    Indexing,
    Ready,
    Answering,
    Failed,
}

/// Raw file handed over by whatever collects uploads.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[derive(Clone)]
struct ActiveDocument {
    index: Arc<Index>,
    models: ModelHandles,
}

/// One user session: at most one indexed document, queried sequentially.
pub struct Pipeline {
    config: Config,
    connector: Arc<dyn ModelConnector>,
    loader: Arc<PdfLoader>,
    indexer: Indexer,
    retriever: Retriever,
    synthesizer: AnswerSynthesizer,
    citations: CitationFormatter,
    state: PipelineState,
    active: Option<ActiveDocument>,
}

impl Pipeline {
    pub fn new(config: Config, connector: Arc<dyn ModelConnector>) -> Result<Self> {
        config.validate()?;

        let template = PromptTemplate::new(config.prompt.template.clone())?;
        let synthesizer = AnswerSynthesizer::new(template, config.provider.max_retries);

        Ok(Self {
            loader: Arc::new(PdfLoader::new(&config.loader)),
            indexer: Indexer::new(&config.provider),
            retriever: Retriever::new(),
            synthesizer,
            citations: CitationFormatter::new(),
            connector,
            config,
            state: PipelineState::Idle,
            active: None,
        })
    }

    pub fn with_openai(config: Config) -> Result<Self> {
        let connector = Arc::new(OpenAiConnector::new(config.provider.clone()));
        Self::new(config, connector)
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn index(&self) -> Option<&Index> {
        self.active.as_ref().map(|active| active.index.as_ref())
    }

    /// Replaces any current document with `upload` and indexes it.
    ///
    /// The credential is checked before the file is parsed, so a bad key
    /// never costs an embedding request.
    pub async fn open(&mut self, upload: Upload, credential: &str) -> Result<IndexingStats> {
        if self.active.take().is_some() {
            info!("Discarding current index");
        }
        self.state = PipelineState::Indexing;

        match self.index_upload(upload, credential).await {
            Ok((active, stats)) => {
                self.active = Some(active);
                self.state = PipelineState::Ready;
                info!("Processing finished: {}", stats.summary());
                Ok(stats)
            }
            Err(e) => {
                self.state = PipelineState::Failed;
                error!("Indexing failed: {}", e);
                Err(e)
            }
        }
    }

    async fn index_upload(
        &self,
        upload: Upload,
        credential: &str,
    ) -> Result<(ActiveDocument, IndexingStats)> {
        let timer = OperationTimer::new("index document");

        let key = ApiKey::parse(credential)?;
        let models = self.connector.connect(&key).await?;

        let loader = Arc::clone(&self.loader);
        let Upload { name, bytes } = upload;
        let pages = tokio::task::spawn_blocking(move || loader.load(&bytes, &name))
            .await
            .map_err(|e| PipelineError::Parse(format!("PDF loading task failed: {}", e)))??;

        let pages_loaded = pages.len();
        let source_name = pages
            .first()
            .map(|page| page.source_name().to_string())
            .unwrap_or_default();

        let embed_timer = OperationTimer::new("embed pages");
        let index = self.indexer.build(pages, models.embedder.as_ref()).await?;
        let embedding = embed_timer.finish_with_count(index.len(), "pages");
        if index.is_empty() {
            warn!("{} has no extractable text; questions cannot be answered", source_name);
        }

        let stats = IndexingStats {
            source_name,
            pages_loaded,
            pages_embedded: index.len(),
            pages_skipped: pages_loaded - index.len(),
            embedding_batches: self.indexer.batch_count(index.len()),
            dimension: index.dimension(),
            pages_per_second: embedding.per_second,
            duration_ms: timer.finish().as_millis() as u64,
        };

        Ok((
            ActiveDocument {
                index: Arc::new(index),
                models,
            },
            stats,
        ))
    }

    /// Answers with the configured `top_k`.
    pub async fn ask(&mut self, question: &str) -> Result<AnswerEnvelope> {
        let k = self.config.retrieval.top_k;
        self.ask_with_k(question, k).await
    }

    pub async fn ask_with_k(&mut self, question: &str, k: usize) -> Result<AnswerEnvelope> {
        let active = match (self.state, &self.active) {
            (PipelineState::Ready, Some(active)) => active.clone(),
            (state, _) => {
                return Err(PipelineError::Validation(format!(
                    "no document is ready for questions (state: {:?})",
                    state
                )));
            }
        };

        Validator::validate_query(question)?;
        Validator::validate_top_k(k)?;

        self.state = PipelineState::Answering;
        let result = self.answer(&active, question, k).await;
        self.state = PipelineState::Ready;

        if let Err(ref e) = result {
            warn!("Question failed: {}", e);
        }
        result
    }

    async fn answer(
        &self,
        active: &ActiveDocument,
        question: &str,
        k: usize,
    ) -> Result<AnswerEnvelope> {
        let timer = OperationTimer::new("answer question");

        let retrieved = self
            .retriever
            .query(&active.index, question, k, active.models.embedder.as_ref())
            .await?;
        debug!("Context pages:\n{}", retrieved.format_summary(120));

        let answer = self
            .synthesizer
            .synthesize(question, &retrieved, active.models.chat.as_ref())
            .await?;

        let envelope = self
            .citations
            .format(&answer, &retrieved, active.index.source_name())?;

        timer.finish();
        Ok(envelope)
    }

    /// Ends the session and drops the index.
    pub fn close(&mut self) {
        self.active = None;
        self.state = PipelineState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::parser::pdf::tests::build_test_pdf;
    use crate::provider::fake::{FakeConnector, HashingEmbedder, ScriptedChat};
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    const KEY: &str = "sk-test-key";

    struct Harness {
        pipeline: Pipeline,
        connector: Arc<FakeConnector>,
        embedder: Arc<HashingEmbedder>,
        chat: Arc<ScriptedChat>,
    }

    fn harness(responses: Vec<Result<String>>) -> Harness {
        let embedder = Arc::new(HashingEmbedder::new(64));
        let chat = Arc::new(ScriptedChat::new(responses));
        let connector = Arc::new(FakeConnector::new(KEY, embedder.clone(), chat.clone()));
        let pipeline = Pipeline::new(Config::default_config(), connector.clone()).unwrap();

        Harness {
            pipeline,
            connector,
            embedder,
            chat,
        }
    }

    fn fruit_upload() -> Upload {
        Upload::new(
            "fruit.pdf",
            build_test_pdf(&["Apples are red.", "Bananas are yellow.", "Grapes are purple."]),
        )
    }

    #[tokio::test]
    async fn test_fruit_scenario() {
        let mut h = harness(vec![Ok("Bananas are yellow.".to_string())]);

        let stats = h.pipeline.open(fruit_upload(), KEY).await.unwrap();
        assert_eq!(h.pipeline.state(), PipelineState::Ready);
        assert_eq!(stats.pages_loaded, 3);
        assert_eq!(stats.pages_embedded, 3);
        assert_eq!(stats.embedding_batches, 1);

        let envelope = h.pipeline.ask("What color are bananas?").await.unwrap();
        assert_eq!(h.pipeline.state(), PipelineState::Ready);

        let prompt = h.chat.prompts.lock().unwrap()[0].clone();
        for page in ["Apples are red.", "Bananas are yellow.", "Grapes are purple."] {
            assert!(prompt.contains(page));
        }

        assert!(envelope.rendered().contains("yellow"));
        assert!(envelope.rendered().contains("fruit.pdf"));
        assert_eq!(envelope.cited_pages[0], 1);
        assert_eq!(envelope.source_name, "fruit.pdf");
    }

    #[tokio::test]
    async fn test_empty_credential_fails_before_any_work() {
        let mut h = harness(vec![]);

        let err = h.pipeline.open(fruit_upload(), "   ").await.unwrap_err();

        assert_eq!(h.pipeline.state(), PipelineState::Failed);
        assert_eq!(err.kind(), ErrorKind::InvalidCredential);
        assert!(err.user_message().contains("Invalid API Key"));
        assert_eq!(h.connector.connects.load(Ordering::SeqCst), 0);
        assert_eq!(h.embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_rejected_credential_fails_before_embedding() {
        let mut h = harness(vec![]);

        let err = h.pipeline.open(fruit_upload(), "sk-wrong").await.unwrap_err();

        assert_eq!(h.pipeline.state(), PipelineState::Failed);
        assert!(err.user_message().starts_with("Invalid API Key"));
        assert_eq!(h.embedder.call_count(), 0);
        assert!(h.pipeline.index().is_none());
    }

    #[tokio::test]
    async fn test_single_page_with_k_three() {
        let mut h = harness(vec![Ok("Yellow.".to_string())]);
        let upload = Upload::new("one.pdf", build_test_pdf(&["Bananas are yellow."]));

        h.pipeline.open(upload, KEY).await.unwrap();
        let envelope = h.pipeline.ask_with_k("bananas?", 3).await.unwrap();

        assert_eq!(envelope.cited_pages, vec![0]);
    }

    #[tokio::test]
    async fn test_malformed_upload_creates_no_index() {
        let mut h = harness(vec![]);
        let upload = Upload::new("notes.txt", b"plain text, not a pdf".to_vec());

        let err = h.pipeline.open(upload, KEY).await.unwrap_err();

        assert!(matches!(err, PipelineError::Parse(_)));
        assert_eq!(h.pipeline.state(), PipelineState::Failed);
        assert!(h.pipeline.index().is_none());
        assert_eq!(h.embedder.call_count(), 0);
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_index() {
        let mut h = harness(vec![
            Err(PipelineError::Generation("rate limited".to_string())),
            Ok("Grapes are purple.".to_string()),
        ]);
        h.pipeline.open(fruit_upload(), KEY).await.unwrap();

        let err = h.pipeline.ask("Which fruit is purple?").await.unwrap_err();
        assert!(matches!(err, PipelineError::Generation(_)));
        assert_eq!(h.pipeline.state(), PipelineState::Ready);

        let envelope = h.pipeline.ask("Which fruit is purple?").await.unwrap();
        assert_eq!(envelope.cited_pages[0], 2);
    }

    #[tokio::test]
    async fn test_empty_query_reported_separately() {
        let mut h = harness(vec![]);
        h.pipeline.open(fruit_upload(), KEY).await.unwrap();

        let err = h.pipeline.ask("  ").await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::EmptyQuery);
        assert_eq!(h.pipeline.state(), PipelineState::Ready);
        assert_eq!(h.chat.prompt_count(), 0);
    }

    #[tokio::test]
    async fn test_question_before_upload_is_rejected() {
        let mut h = harness(vec![]);

        let err = h.pipeline.ask("anything").await.unwrap_err();

        assert!(matches!(err, PipelineError::Validation(_)));
        assert_eq!(h.pipeline.state(), PipelineState::Idle);
    }

    #[tokio::test]
    async fn test_new_upload_replaces_index() {
        let mut h = harness(vec![Ok("Grapes.".to_string())]);
        h.pipeline.open(fruit_upload(), KEY).await.unwrap();
        let first = h.pipeline.index().unwrap().fingerprint().to_string();

        let upload = Upload::new("veg.pdf", build_test_pdf(&["Carrots are orange."]));
        h.pipeline.open(upload, KEY).await.unwrap();

        let index = h.pipeline.index().unwrap();
        assert_ne!(index.fingerprint(), first);
        assert_eq!(index.source_name(), "veg.pdf");
        assert_eq!(index.pages().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_recovers_with_new_file() {
        let mut h = harness(vec![]);
        h.pipeline
            .open(Upload::new("bad.pdf", b"garbage".to_vec()), KEY)
            .await
            .unwrap_err();
        assert_eq!(h.pipeline.state(), PipelineState::Failed);
        assert!(h.pipeline.ask("anything").await.is_err());

        h.pipeline.open(fruit_upload(), KEY).await.unwrap();
        assert_eq!(h.pipeline.state(), PipelineState::Ready);
    }

    #[tokio::test]
    async fn test_close_returns_to_idle() {
        let mut h = harness(vec![]);
        h.pipeline.open(fruit_upload(), KEY).await.unwrap();

        h.pipeline.close();

        assert_eq!(h.pipeline.state(), PipelineState::Idle);
        assert!(h.pipeline.index().is_none());
    }
}
