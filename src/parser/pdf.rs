// file: src/parser/pdf.rs
// description: turns uploaded pdf bytes into one page record per physical page
// reference: https://docs.rs/lopdf

use crate::config::LoaderConfig;
use crate::error::{PipelineError, Result};
use crate::models::PageRecord;
use crate::parser::normalizer::TextNormalizer;
use crate::utils::Validator;
use lopdf::Document;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub struct PdfLoader {
    normalizer: Option<TextNormalizer>,
    max_file_size_mb: usize,
    staging_dir: Option<PathBuf>,
}

impl PdfLoader {
    pub fn new(config: &LoaderConfig) -> Self {
        let normalizer = if config.normalize_text {
            Some(TextNormalizer::new())
        } else {
            None
        };

        Self {
            normalizer,
            max_file_size_mb: config.max_file_size_mb,
            staging_dir: config.staging_dir.clone(),
        }
    }

    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Parses `bytes` into ordered, zero-based page records.
    ///
    /// The bytes are staged in a temporary file for the parser; the file is
    /// removed when this function returns, whichever path it returns on.
    pub fn load(&self, bytes: &[u8], source_name: &str) -> Result<Vec<PageRecord>> {
        Validator::validate_file_size(bytes.len(), self.max_file_size_mb)?;
        Validator::validate_pdf_header(bytes)?;

        let source_name = display_name(source_name);
        info!("Loading PDF {} ({} bytes)", source_name, bytes.len());

        let mut staged = match self.staging_dir {
            Some(ref dir) => NamedTempFile::new_in(dir)?,
            None => NamedTempFile::new()?,
        };
        staged.write_all(bytes)?;
        staged.flush()?;

        let mut document = Document::load(staged.path())
            .map_err(|e| PipelineError::Parse(format!("failed to read {}: {}", source_name, e)))?;

        // owner-password-only files open with the empty user password
        if document.is_encrypted() {
            document.decrypt("").map_err(|e| {
                PipelineError::Parse(format!(
                    "{} is encrypted and no password was supplied: {}",
                    source_name, e
                ))
            })?;
            info!("Opened {} with an empty user password", source_name);
        }

        let page_ids = document.get_pages();
        if page_ids.is_empty() {
            warn!("PDF {} contains no pages", source_name);
        }

        let mut pages = Vec::with_capacity(page_ids.len());

        for (page_number, &physical_number) in page_ids.keys().enumerate() {
            let raw = match document.extract_text(&[physical_number]) {
                Ok(text) => text,
                Err(e) => {
                    warn!(
                        "No extractable text on page {} of {}: {}",
                        page_number, source_name, e
                    );
                    String::new()
                }
            };

            let text = match self.normalizer {
                Some(ref normalizer) => normalizer.normalize(&raw),
                None => raw,
            };

            debug!("Page {}: {} chars", page_number, text.len());
            pages.push(PageRecord::new(text, page_number, source_name.clone()));
        }

        info!("Loaded {} pages from {}", pages.len(), source_name);
        Ok(pages)
    }
}

impl Default for PdfLoader {
    fn default() -> Self {
        Self {
            normalizer: Some(TextNormalizer::new()),
            max_file_size_mb: 0,
            staging_dir: None,
        }
    }
}

/// Keeps only the file name, so citations never leak a local directory layout.
fn display_name(source_name: &str) -> String {
    Path::new(source_name)
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("document.pdf")
        .to_string()
}
