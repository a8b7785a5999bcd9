//! Document number format.
//!
//! Document numbers follow `PREFIX-YEAR-sequence`, e.g. `ADJ-2026-0042`.
//! The next sequence value comes from an atomic per-(prefix, year) counter
//! in the database; parsing exists for display and validation of numbers,
//! never to derive the next sequence from the highest existing one.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::inventory::types::DocumentKind;

/// Sequence digits in freshly generated numbers. Parsing accepts any width.
const SEQUENCE_WIDTH: usize = 4;

/// Returns the number prefix for a document kind.
#[must_use]
pub fn prefix_for(kind: DocumentKind) -> &'static str {
    match kind {
        DocumentKind::ItemEntry => "ENT",
        DocumentKind::Withdrawal => "WTH",
        DocumentKind::Transfer => "TRF",
        DocumentKind::Adjustment => "ADJ",
    }
}

/// A parsed document number.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentNumber {
    /// Document-type prefix (e.g. `ADJ`).
    pub prefix: String,
    /// Calendar year the number belongs to.
    pub year: i32,
    /// Sequence within the prefix+year.
    pub sequence: u32,
}

impl DocumentNumber {
    /// Builds a document number from its parts.
    #[must_use]
    pub fn new(prefix: impl Into<String>, year: i32, sequence: u32) -> Self {
        Self {
            prefix: prefix.into(),
            year,
            sequence,
        }
    }
}

impl fmt::Display for DocumentNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-{}-{:0width$}",
            self.prefix,
            self.year,
            self.sequence,
            width = SEQUENCE_WIDTH
        )
    }
}

/// Errors from parsing a document number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberParseError {
    /// The string does not have the `PREFIX-YEAR-sequence` shape.
    #[error("Malformed document number: {0}")]
    Malformed(String),
}

impl FromStr for DocumentNumber {
    type Err = NumberParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || NumberParseError::Malformed(s.to_string());

        let mut parts = s.splitn(3, '-');
        let prefix = parts.next().filter(|p| !p.is_empty()).ok_or_else(malformed)?;
        let year = parts
            .next()
            .and_then(|y| y.parse::<i32>().ok())
            .filter(|y| *y >= 1000)
            .ok_or_else(malformed)?;
        let sequence = parts
            .next()
            .and_then(|n| n.parse::<u32>().ok())
            .ok_or_else(malformed)?;

        Ok(Self {
            prefix: prefix.to_string(),
            year,
            sequence,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_format() {
        let number = DocumentNumber::new("ADJ", 2026, 42);
        assert_eq!(number.to_string(), "ADJ-2026-0042");
    }

    #[test]
    fn test_format_wide_sequence() {
        let number = DocumentNumber::new("ENT", 2026, 123_456);
        assert_eq!(number.to_string(), "ENT-2026-123456");
    }

    #[test]
    fn test_parse_roundtrip() {
        let number = DocumentNumber::new("TRF", 2025, 7);
        let parsed: DocumentNumber = number.to_string().parse().unwrap();
        assert_eq!(parsed, number);
    }

    #[test]
    fn test_parse_accepts_any_width() {
        let parsed: DocumentNumber = "WTH-2024-123456".parse().unwrap();
        assert_eq!(parsed.sequence, 123_456);
    }

    #[rstest]
    #[case("")]
    #[case("ADJ")]
    #[case("ADJ-2026")]
    #[case("ADJ-abcd-1")]
    #[case("ADJ-2026-")]
    #[case("ADJ-2026-x7")]
    #[case("-2026-12")]
    fn test_parse_rejects_garbage(#[case] input: &str) {
        assert!(matches!(
            input.parse::<DocumentNumber>(),
            Err(NumberParseError::Malformed(_))
        ));
    }

    #[test]
    fn test_prefixes() {
        assert_eq!(prefix_for(DocumentKind::ItemEntry), "ENT");
        assert_eq!(prefix_for(DocumentKind::Withdrawal), "WTH");
        assert_eq!(prefix_for(DocumentKind::Transfer), "TRF");
        assert_eq!(prefix_for(DocumentKind::Adjustment), "ADJ");
    }
}
