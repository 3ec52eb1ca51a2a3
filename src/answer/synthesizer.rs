// file: src/answer/synthesizer.rs
// description: grounded answer generation from retrieved pages
// reference: https://platform.openai.com/docs/guides/text-generation

use crate::answer::prompt::PromptTemplate;
use crate::error::Result;
use crate::models::RetrievalResult;
use crate::provider::ChatModel;
use crate::utils::Validator;
use tracing::{debug, warn};

/// Separator placed between page texts in the grounding context.
pub const CONTEXT_SEPARATOR: &str = "\n\n";

pub struct AnswerSynthesizer {
    template: PromptTemplate,
    max_retries: u8,
}

impl AnswerSynthesizer {
    pub fn new(template: PromptTemplate, max_retries: u8) -> Self {
        Self {
            template,
            max_retries: max_retries.min(1),
        }
    }

    pub fn template(&self) -> &PromptTemplate {
        &self.template
    }

    /// Page texts in retrieval order.
    pub fn build_context(retrieved: &RetrievalResult) -> String {
        retrieved
            .pages()
            .map(|page| page.text())
            .collect::<Vec<_>>()
            .join(CONTEXT_SEPARATOR)
    }

    pub fn build_prompt(&self, query_text: &str, retrieved: &RetrievalResult) -> String {
        self.template
            .render(&Self::build_context(retrieved), query_text.trim())
    }

    /// Issues one generation request; a transient failure is retried at most
    /// `max_retries` times (0 or 1).
    pub async fn synthesize(
        &self,
        query_text: &str,
        retrieved: &RetrievalResult,
        chat: &dyn ChatModel,
    ) -> Result<String> {
        Validator::validate_query(query_text)?;

        let prompt = self.build_prompt(query_text, retrieved);
        debug!(
            "Prompting {} with {} pages of context ({} chars)",
            chat.model_name(),
            retrieved.len(),
            prompt.len()
        );

        let mut attempt = 0;
        loop {
            match chat.complete(&prompt).await {
                Ok(answer) => return Ok(answer),
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    warn!("Generation failed, retrying once: {}", e);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for AnswerSynthesizer {
    fn default() -> Self {
        Self::new(PromptTemplate::default(), 0)
    }
}
