// file: src/models/page.rs
// description: page record produced by the pdf loader
// reference: internal data structures

use serde::{Deserialize, Serialize};

/// One physical page of an uploaded document. Page numbers are zero-based and
/// match the page's position in the source PDF.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    text: String,
    page_number: usize,
    source_name: String,
}

impl PageRecord {
    pub fn new(text: String, page_number: usize, source_name: String) -> Self {
        Self {
            text,
            page_number,
            source_name,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn page_number(&self) -> usize {
        self.page_number
    }

    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Pages without extractable text are kept for alignment but never embedded.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_record_accessors() {
        let page = PageRecord::new("Apples are red.".to_string(), 0, "fruit.pdf".to_string());

        assert_eq!(page.text(), "Apples are red.");
        assert_eq!(page.page_number(), 0);
        assert_eq!(page.source_name(), "fruit.pdf");
        assert!(!page.is_empty());
    }

    #[test]
    fn test_whitespace_page_is_empty() {
        let page = PageRecord::new(" \n\t".to_string(), 4, "scan.pdf".to_string());
        assert!(page.is_empty());
    }
}
