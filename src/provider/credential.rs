// file: src/provider/credential.rs
// description: api credential wrapper that never prints its secret

use crate::error::{PipelineError, Result};
use std::fmt;

#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Local sanity check only; the provider has the final word.
    pub fn parse(raw: &str) -> Result<Self> {
        let key = raw.trim();

        if key.is_empty() {
            return Err(PipelineError::InvalidCredential(
                "API key is empty".to_string(),
            ));
        }

        if !key.chars().all(|c| c.is_ascii_graphic()) {
            return Err(PipelineError::InvalidCredential(
                "API key contains whitespace or non-ASCII characters".to_string(),
            ));
        }

        Ok(Self(key.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims() {
        let key = ApiKey::parse("  sk-test-123\n").unwrap();
        assert_eq!(key.expose(), "sk-test-123");
    }

    #[test]
    fn test_rejects_empty_key() {
        let err = ApiKey::parse("   ").unwrap_err();
        assert!(err.user_message().contains("Invalid API Key"));
    }

    #[test]
    fn test_rejects_inner_whitespace() {
        assert!(matches!(
            ApiKey::parse("sk test"),
            Err(PipelineError::InvalidCredential(_))
        ));
    }

    #[test]
    fn test_debug_is_redacted() {
        let key = ApiKey::parse("sk-secret").unwrap();
        assert!(!format!("{:?}", key).contains("secret"));
    }
}
