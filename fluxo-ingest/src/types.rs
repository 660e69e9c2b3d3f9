use std::fmt;

use fluxo_core::TransactionType;
use serde::{Deserialize, Serialize};

use crate::classify::TypeSource;

/// A positioned text fragment from one page.
///
/// `text` is never empty after trimming; coordinates are page space
/// (origin bottom-left, so larger `y` is higher on the page).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub text: String,
    pub x: f64,
    pub y: f64,
}

impl PositionedToken {
    pub fn new(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            x,
            y,
        }
    }
}

/// Tokens believed to share one visual row, ordered left to right.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReconstructedLine {
    pub tokens: Vec<PositionedToken>,
}

impl ReconstructedLine {
    /// Tokens joined with single spaces.
    pub fn text(&self) -> String {
        self.tokens
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// The `y` of the first token assigned to the row.
    pub fn reference_y(&self) -> Option<f64> {
        self.tokens.first().map(|t| t.y)
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// A statement row date: `DD/MM`, optionally with a two-digit year suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CandidateDate {
    pub day: u32,
    pub month: u32,
    /// Two-digit year as printed (`24` in `14/11/24`).
    pub year_suffix: Option<u32>,
}

impl CandidateDate {
    /// Parse `DD/MM` or `DD/MM/YY`. Full four-digit years are not row dates.
    pub fn parse(s: &str) -> Option<Self> {
        let mut parts = s.trim().split('/');
        let day = two_digits(parts.next()?)?;
        let month = two_digits(parts.next()?)?;
        let year_suffix = match parts.next() {
            Some(yy) => Some(two_digits(yy)?),
            None => None,
        };
        if parts.next().is_some() || !(1..=31).contains(&day) || !(1..=12).contains(&month) {
            return None;
        }
        Some(Self {
            day,
            month,
            year_suffix,
        })
    }
}

fn two_digits(s: &str) -> Option<u32> {
    if s.len() == 2 && s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}

impl fmt::Display for CandidateDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:02}", self.day, self.month)?;
        if let Some(yy) = self.year_suffix {
            write!(f, "/{yy:02}")?;
        }
        Ok(())
    }
}

/// A tentative transaction produced by a grammar strategy, before
/// year completion, status derivation and dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCandidate {
    pub date: CandidateDate,
    pub description: String,
    /// Always a positive magnitude.
    pub value: f64,
    pub kind: TransactionType,
    /// How `kind` was decided.
    pub type_source: TypeSource,
    pub is_future: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_candidate_dates() {
        let d = CandidateDate::parse("14/11").unwrap();
        assert_eq!((d.day, d.month, d.year_suffix), (14, 11, None));

        let d = CandidateDate::parse("08/12/24").unwrap();
        assert_eq!(d.year_suffix, Some(24));
        assert_eq!(d.to_string(), "08/12/24");

        assert!(CandidateDate::parse("15/03/2024").is_none());
        assert!(CandidateDate::parse("32/01").is_none());
        assert!(CandidateDate::parse("01/13").is_none());
        assert!(CandidateDate::parse("1/1").is_none());
    }

    #[test]
    fn test_line_text_joins_tokens() {
        let line = ReconstructedLine {
            tokens: vec![
                PositionedToken::new("14/11", 10.0, 700.0),
                PositionedToken::new("TARIFA", 60.0, 701.0),
            ],
        };
        assert_eq!(line.text(), "14/11 TARIFA");
        assert_eq!(line.reference_y(), Some(700.0));
    }
}
