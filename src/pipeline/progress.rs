// file: src/pipeline/progress.rs
// description: indexing statistics and a terminal spinner for long-running steps
// reference: uses indicatif for progress display and tracks indexing metrics

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use std::time::Duration;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndexingStats {
    pub source_name: String,
    pub pages_loaded: usize,
    pub pages_embedded: usize,
    pub pages_skipped: usize,
    pub embedding_batches: usize,
    pub dimension: usize,
    pub pages_per_second: f64,
    pub duration_ms: u64,
}

impl IndexingStats {
    /// Share of pages that became searchable, as a percentage.
    pub fn coverage(&self) -> f64 {
        if self.pages_loaded == 0 {
            return 0.0;
        }
        (self.pages_embedded as f64 / self.pages_loaded as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{}: {} pages, {} indexed, {} without text ({} request(s), {:.1} pages/s, {}ms)",
            self.source_name,
            self.pages_loaded,
            self.pages_embedded,
            self.pages_skipped,
            self.embedding_batches,
            self.pages_per_second,
            self.duration_ms
        )
    }
}

pub struct ProgressSpinner {
    bar: ProgressBar,
}

impl ProgressSpinner {
    pub fn new(message: &str, colored: bool) -> Self {
        let bar = ProgressBar::new_spinner();
        let template = if colored {
            "{spinner:.green} {msg}"
        } else {
            "{spinner} {msg}"
        };
        if let Ok(style) = ProgressStyle::default_spinner().template(template) {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Spinner that draws nothing, for machine-readable output.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    pub fn finish(&self, message: String) {
        self.bar.finish_with_message(message);
    }

    pub fn clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
