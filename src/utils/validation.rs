// file: src/utils/validation.rs
// description: input validation utilities for uploads, queries and settings
// reference: input validation patterns

use crate::error::{PipelineError, Result};

const PDF_MAGIC: &[u8] = b"%PDF";

pub struct Validator;

impl Validator {
    pub fn validate_query(query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(PipelineError::EmptyQuery);
        }
        Ok(())
    }

    pub fn validate_top_k(k: usize) -> Result<()> {
        if k == 0 {
            return Err(PipelineError::Validation(
                "k must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Checks the `%PDF` magic bytes. Some writers emit leading garbage, so the
    /// header may appear anywhere within the first kilobyte.
    pub fn validate_pdf_header(bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            return Err(PipelineError::Parse("uploaded file is empty".to_string()));
        }

        let window = &bytes[..bytes.len().min(1024)];
        if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
            Ok(())
        } else {
            Err(PipelineError::Parse(
                "file does not look like a PDF (missing %PDF header)".to_string(),
            ))
        }
    }

    pub fn validate_file_size(len: usize, max_file_size_mb: usize) -> Result<()> {
        let max_bytes = max_file_size_mb.saturating_mul(1_048_576);
        if max_bytes > 0 && len > max_bytes {
            return Err(PipelineError::Validation(format!(
                "file too large ({} bytes, limit {} MB)",
                len, max_file_size_mb
            )));
        }
        Ok(())
    }

    pub fn validate_url(url: &str) -> Result<()> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(PipelineError::Validation(format!(
                "Invalid URL format: {}",
                url
            )));
        }
        Ok(())
    }

    pub fn truncate_text(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            text.to_string()
        } else {
            let truncated: String = text.chars().take(max_chars).collect();
            format!("{}...", truncated)
        }
    }
}
