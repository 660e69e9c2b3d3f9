//! Per-source statement profiles.
//!
//! The same row grammar gets re-tuned for each bank layout, so the row
//! clustering tolerance and every keyword list live here instead of in code.

use fluxo_core::TransactionType;
use regex::RegexSet;
use serde::{Deserialize, Serialize};

use crate::error::{IngestError, Result};

pub const BUILTIN_PROFILES: &[&str] = &["default", "tight", "loose"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatementProfile {
    pub name: String,

    /// Max |dy| between a token and its row's first token.
    pub y_tolerance: f64,

    /// Rows containing any of these (case-insensitive) are balance or
    /// metadata rows, never transactions.
    pub skip_keywords: Vec<String>,

    /// Regex patterns, matched case-insensitively, that open the
    /// future/scheduled section.
    pub future_section_patterns: Vec<String>,

    pub expense_keywords: Vec<String>,
    pub income_keywords: Vec<String>,

    /// Type used when a row has no C/D marker and no keyword match.
    pub ambiguous_type: TransactionType,

    /// Minimum cleaned description length, in characters.
    pub min_description_len: usize,

    /// A wrapped row is abandoned once its text grows past this.
    pub max_continuation_chars: usize,
}

impl Default for StatementProfile {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            y_tolerance: 3.0,
            skip_keywords: strings(&["SALDO", "BLOQ", "LIMITE", "RESUMO", "ANTERIOR", "DISPONÍVEL"]),
            future_section_patterns: strings(&[
                r"lan[çc]amentos\s+futuros",
                r"lanc\.?\s+futuros",
                r"previstos",
                r"agendados",
            ]),
            expense_keywords: strings(&[
                "DEB", "EMIT", "TARIFA", "PAGAMENTO", "SAQUE", "TED", "DOC", "PIX ENV", "TRANSF.",
            ]),
            income_keywords: strings(&["REC", "CRED", "DEP", "PIX REC", "TRANSF REC"]),
            ambiguous_type: TransactionType::Expense,
            min_description_len: 2,
            max_continuation_chars: 400,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl StatementProfile {
    /// Look up a built-in profile by name.
    ///
    /// `tight` and `loose` cover the two row-spacing families seen in the
    /// wild; everything else is shared with `default`.
    pub fn builtin(name: &str) -> Option<Self> {
        let base = Self::default();
        match name {
            "default" => Some(base),
            "tight" => Some(base.with_name("tight").with_y_tolerance(2.0)),
            "loose" => Some(base.with_name("loose").with_y_tolerance(6.0)),
            _ => None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_y_tolerance(mut self, y_tolerance: f64) -> Self {
        self.y_tolerance = y_tolerance;
        self
    }

    pub fn with_ambiguous_type(mut self, kind: TransactionType) -> Self {
        self.ambiguous_type = kind;
        self
    }

    pub fn with_skip_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.skip_keywords.push(keyword.into());
        self
    }

    pub fn with_future_section_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.future_section_patterns.push(pattern.into());
        self
    }

    pub fn with_min_description_len(mut self, len: usize) -> Self {
        self.min_description_len = len;
        self
    }

    /// Check the values a parse relies on.
    pub fn validate(&self) -> Result<()> {
        if !self.y_tolerance.is_finite() || self.y_tolerance < 0.0 {
            return Err(IngestError::Profile(format!(
                "{}: y_tolerance must be a non-negative number, got {}",
                self.name, self.y_tolerance
            )));
        }
        if self.max_continuation_chars == 0 {
            return Err(IngestError::Profile(format!(
                "{}: max_continuation_chars must be positive",
                self.name
            )));
        }
        self.future_section_matcher().map(|_| ())
    }

    /// Compile the future-section header patterns (case-insensitive).
    pub fn future_section_matcher(&self) -> Result<RegexSet> {
        RegexSet::new(self.future_section_patterns.iter().map(|p| format!("(?i){p}")))
            .map_err(|e| IngestError::Profile(format!("{}: bad future-section pattern: {e}", self.name)))
    }

    /// True if `text` contains a skip keyword.
    pub fn is_skip_line(&self, text: &str) -> bool {
        contains_any(&text.to_uppercase(), &self.skip_keywords)
    }
}

/// Case-insensitive substring match; `haystack` must already be uppercase.
pub(crate) fn contains_any(haystack: &str, keywords: &[String]) -> bool {
    keywords
        .iter()
        .any(|k| !k.is_empty() && haystack.contains(&k.to_uppercase()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_profiles() {
        for name in BUILTIN_PROFILES {
            let p = StatementProfile::builtin(name).unwrap();
            assert_eq!(p.name, *name);
            p.validate().unwrap();
        }
        assert_eq!(StatementProfile::builtin("tight").unwrap().y_tolerance, 2.0);
        assert_eq!(StatementProfile::builtin("loose").unwrap().y_tolerance, 6.0);
        assert!(StatementProfile::builtin("nubank").is_none());
    }

    #[test]
    fn test_skip_lines_case_insensitive() {
        let p = StatementProfile::default();
        assert!(p.is_skip_line("SALDO DO DIA 1.200,00"));
        assert!(p.is_skip_line("Limite disponível 5.000,00"));
        assert!(p.is_skip_line("saldo bloq. 10,00"));
        assert!(!p.is_skip_line("14/11 PIX REC.OUTRA IF MT 1,00C"));
    }

    #[test]
    fn test_future_header_phrasings() {
        let set = StatementProfile::default().future_section_matcher().unwrap();
        assert!(set.is_match("LANÇAMENTOS FUTUROS"));
        assert!(set.is_match("Lançamentos futuros"));
        assert!(set.is_match("lancamentos futuros"));
        assert!(set.is_match("Lanc. Futuros"));
        assert!(set.is_match("Débitos previstos"));
        assert!(set.is_match("PAGAMENTOS AGENDADOS"));
        assert!(!set.is_match("14/11 PIX REC.OUTRA IF MT 1,00C"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let p = StatementProfile::default().with_y_tolerance(-1.0);
        assert!(matches!(p.validate(), Err(IngestError::Profile(_))));

        let p = StatementProfile::default().with_future_section_pattern("(unclosed");
        assert!(matches!(p.validate(), Err(IngestError::Profile(_))));
    }

    #[test]
    fn test_deserialize_partial_profile() {
        let p: StatementProfile = serde_json::from_str(r#"{"name":"itau","y_tolerance":4.5,"ambiguous_type":"income"}"#).unwrap();
        assert_eq!(p.name, "itau");
        assert_eq!(p.y_tolerance, 4.5);
        assert_eq!(p.ambiguous_type, TransactionType::Income);
        assert!(p.skip_keywords.iter().any(|k| k == "SALDO"));
    }
}
