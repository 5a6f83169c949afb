//! Reference/patient identifier extraction from free text.

use once_cell::sync::Lazy;
use regex::Regex;

/// Candidate identifiers, leftmost match first, then in this priority:
/// "ref"-prefixed tokens, "ref" followed by a number, "pt"-prefixed tokens,
/// two letters followed by two or more digits, bare numbers of three or more digits.
static IDENTIFIER_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(ref[-_0-9a-zA-Z]+|\bref\s*\d+|\bpt[-_0-9a-zA-Z]+|\b[a-zA-Z]{2}\d{2,}|\b\d{3,})")
        .expect("valid identifier pattern")
});

/// A standalone label word plus an optional separator.
static LABEL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(reference|patient|ref|pt)\b\s*[:#_\-]?\s*")
        .expect("valid label pattern")
});

/// Finds the reference a chat message is talking about.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentifierExtractor;

impl IdentifierExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract an identifier from `text`, lower-cased and without label words
    /// or whitespace. Returns `None` when nothing usable matches.
    pub fn extract(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        let raw = IDENTIFIER_PATTERN.find(&lowered)?.as_str();
        let cleaned: String = LABEL_PATTERN
            .replace_all(raw, "")
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        (!cleaned.is_empty()).then_some(cleaned)
    }

    /// Extract from `text`, falling back to the reference carried from the
    /// previous turn.
    pub fn resolve(&self, text: &str, context_ref: Option<&str>) -> Option<String> {
        self.extract(text).or_else(|| {
            context_ref
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string)
        })
    }
}
