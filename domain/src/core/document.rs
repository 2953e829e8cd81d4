//! Requirement document value object

use super::error::WorkflowError;
use super::string::truncate;
use serde::{Deserialize, Serialize};

/// Maximum excerpt length carried in parsing errors
const ERROR_EXCERPT_CHARS: usize = 200;

/// A requirement document submitted for test-suite generation (Value Object)
///
/// Construction never fails; [`Document::validate`] enforces the minimum
/// length the classification stage requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    name: String,
    content: String,
}

impl Document {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Document name (usually the source file name)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of characters after trimming surrounding whitespace
    pub fn significant_len(&self) -> usize {
        self.content.trim().chars().count()
    }

    /// Leading portion of the document, at most `max_chars` characters
    pub fn excerpt(&self, max_chars: usize) -> String {
        truncate(self.content.trim(), max_chars)
    }

    /// Reject empty or too-short input with a parsing error.
    pub fn validate(&self, min_length: usize) -> Result<(), WorkflowError> {
        let len = self.significant_len();
        if len == 0 {
            return Err(WorkflowError::parsing(
                format!("document '{}' is empty", self.name),
                String::new(),
            ));
        }
        if len < min_length {
            return Err(WorkflowError::parsing(
                format!(
                    "document '{}' has {} characters, at least {} required",
                    self.name, len, min_length
                ),
                self.excerpt(ERROR_EXCERPT_CHARS),
            ));
        }
        Ok(())
    }
}

impl std::fmt::Display for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({} chars)", self.name, self.significant_len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ErrorKind;

    #[test]
    fn test_validate_accepts_long_enough_document() {
        let doc = Document::new("urs.md", "The system shall record batch release decisions.");
        assert!(doc.validate(20).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_and_whitespace() {
        for content in ["", "   \n\t  "] {
            let err = Document::new("empty.md", content).validate(1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Parsing);
        }
    }

    #[test]
    fn test_validate_rejects_short_document() {
        let err = Document::new("short.md", "too short").validate(50).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parsing);
        assert!(err.to_string().contains("at least 50"));
    }

    #[test]
    fn test_excerpt_is_trimmed_and_bounded() {
        let doc = Document::new("a.md", "   abcdefghijklmnop   ");
        assert_eq!(doc.excerpt(8), "abcde...");
        assert_eq!(doc.excerpt(100), "abcdefghijklmnop");
    }

    #[test]
    fn test_excerpt_budget_is_in_characters() {
        let doc = Document::new("de.md", "Prüfung der Chargenfreigabe für Öl");
        let excerpt = doc.excerpt(10);
        assert_eq!(excerpt, "Prüfung...");
        assert_eq!(excerpt.chars().count(), 10);
        assert_eq!(doc.excerpt(34), "Prüfung der Chargenfreigabe für Öl");
    }
}
