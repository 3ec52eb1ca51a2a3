// file: src/parser/normalizer.rs
// description: cleanup of text extracted from pdf pages
// reference: lopdf text extraction output

pub struct TextNormalizer;

impl TextNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn normalize(&self, content: &str) -> String {
        let mut normalized = self.normalize_line_endings(content);

        normalized = self.strip_control_chars(&normalized);
        normalized = self.join_hyphenated_words(&normalized);
        normalized = self.normalize_line_breaks(&normalized);

        normalized.trim().to_string()
    }

    fn normalize_line_endings(&self, content: &str) -> String {
        content.replace("\r\n", "\n").replace('\r', "\n")
    }

    fn strip_control_chars(&self, content: &str) -> String {
        content
            .chars()
            .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
            .collect()
    }

    // "infor-\nmation" -> "information"
    fn join_hyphenated_words(&self, content: &str) -> String {
        let lines: Vec<&str> = content.lines().collect();
        let mut result = String::with_capacity(content.len());

        for (i, line) in lines.iter().enumerate() {
            let trimmed = line.trim_end();
            let next_starts_lower = lines
                .get(i + 1)
                .and_then(|next| next.trim_start().chars().next())
                .is_some_and(|c| c.is_lowercase());

            let ends_with_split = trimmed.len() > 1
                && trimmed.ends_with('-')
                && trimmed[..trimmed.len() - 1]
                    .chars()
                    .last()
                    .is_some_and(char::is_alphabetic);

            if ends_with_split && next_starts_lower {
                result.push_str(&trimmed[..trimmed.len() - 1]);
            } else {
                result.push_str(line);
                if i + 1 < lines.len() {
                    result.push('\n');
                }
            }
        }

        result
    }

    fn normalize_line_breaks(&self, content: &str) -> String {
        let mut result = Vec::new();
        let mut blank_run = 0;

        for line in content.lines().map(str::trim_end) {
            if line.is_empty() {
                blank_run += 1;
                if blank_run > 1 {
                    continue;
                }
            } else {
                blank_run = 0;
            }
            result.push(line);
        }

        result.join("\n")
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}
