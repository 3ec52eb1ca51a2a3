// file: src/answer/prompt.rs
// description: grounding prompt template with context and question placeholders

use crate::config::DEFAULT_PROMPT_TEMPLATE;
use crate::error::{PipelineError, Result};

const CONTEXT: &str = "{context}";
const QUESTION: &str = "{question}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();

        for placeholder in [CONTEXT, QUESTION] {
            if !template.contains(placeholder) {
                return Err(PipelineError::Config(format!(
                    "prompt template is missing the {} placeholder",
                    placeholder
                )));
            }
        }

        Ok(Self { template })
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitutes both placeholders in one pass, so braces inside the page
    /// text or the question are never expanded a second time.
    pub fn render(&self, context: &str, question: &str) -> String {
        let mut rendered =
            String::with_capacity(self.template.len() + context.len() + question.len());
        let mut rest = self.template.as_str();

        while let Some(start) = rest.find('{') {
            rendered.push_str(&rest[..start]);
            let tail = &rest[start..];

            if let Some(after) = tail.strip_prefix(CONTEXT) {
                rendered.push_str(context);
                rest = after;
            } else if let Some(after) = tail.strip_prefix(QUESTION) {
                rendered.push_str(question);
                rest = after;
            } else {
                rendered.push('{');
                rest = &tail[1..];
            }
        }

        rendered.push_str(rest);
        rendered
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_PROMPT_TEMPLATE.to_string(),
        }
    }
}
