//! Import adapter: pick the delimited or document pipeline and produce the
//! store's new-transaction records.
//!
//! An empty result is not an error; the caller decides how to present
//! "nothing importable".

use std::path::Path;

use chrono::{Datelike, NaiveDate};
use fluxo_core::NewTransaction;
use tracing::info;

use crate::delimited::parse_delimited;
use crate::document::PageSource;
use crate::error::{IngestError, Result};
use crate::fragments::extract_tokens;
use crate::grammar::{GrammarContext, StrategyChoice, parse_candidates};
use crate::lines::reconstruct_lines;
use crate::normalize::{NormalizeOptions, build_transaction, dedup, to_record};
use crate::profile::StatementProfile;
use crate::types::ReconstructedLine;
use crate::year::resolve_statement_year;

/// Which pipeline a file goes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// `csv`, `txt`
    Delimited,
    /// `pdf`, or a `json` text-layer dump
    Document,
}

impl FileKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" | "txt" => Ok(Self::Delimited),
            "pdf" | "json" => Ok(Self::Document),
            _ => Err(IngestError::UnsupportedFile(path.display().to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ImportOptions {
    pub profile: StatementProfile,
    pub strategy: StrategyChoice,
    /// Processing date: fallback year and the pending cutoff.
    pub today: NaiveDate,
}

impl ImportOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            profile: StatementProfile::default(),
            strategy: StrategyChoice::default(),
            today,
        }
    }

    pub fn with_profile(mut self, profile: StatementProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_strategy(mut self, strategy: StrategyChoice) -> Self {
        self.strategy = strategy;
        self
    }
}

/// Counters for one import, for logs and the preview footer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    pub pages: usize,
    pub lines: usize,
    pub candidates: usize,
    pub kept: usize,
    pub duplicates: usize,
    pub strategy: &'static str,
    /// Year found in the statement, if any.
    pub year: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportOutcome {
    pub transactions: Vec<NewTransaction>,
    pub report: ImportReport,
}

/// Run a decoded document through the PDF pipeline.
///
/// Pages are fetched strictly in order. A page that fails to decode aborts
/// the whole import: a silently missing page would drop real transactions.
pub async fn import_document<S: PageSource>(source: &mut S, opts: &ImportOptions) -> Result<ImportOutcome> {
    opts.profile.validate()?;

    let pages = source.page_count();
    let mut lines = Vec::new();
    for page_index in 0..pages {
        let fragments = source
            .text_fragments(page_index)
            .await
            .map_err(|e| IngestError::Decode {
                page: page_index + 1,
                reason: e.to_string(),
            })?;
        lines.extend(reconstruct_lines(extract_tokens(&fragments), opts.profile.y_tolerance));
    }

    let mut outcome = import_lines(&lines, opts)?;
    outcome.report.pages = pages;
    info!(
        pages,
        lines = outcome.report.lines,
        candidates = outcome.report.candidates,
        kept = outcome.report.kept,
        duplicates = outcome.report.duplicates,
        strategy = outcome.report.strategy,
        "statement parsed"
    );
    Ok(outcome)
}

/// Grammar and normalization over already-reconstructed lines, in document order.
pub fn import_lines(lines: &[ReconstructedLine], opts: &ImportOptions) -> Result<ImportOutcome> {
    let ctx = GrammarContext::new(&opts.profile)?;

    let texts: Vec<String> = lines.iter().map(|l| l.text()).collect();
    let year = resolve_statement_year(texts.iter().map(|s| s.as_str()));

    let (candidates, strategy) = parse_candidates(lines, &ctx, opts.strategy);
    let candidate_count = candidates.len();

    let normalize_opts = NormalizeOptions {
        year: year.unwrap_or_else(|| opts.today.year()),
        today: opts.today,
    };
    let records = candidates
        .into_iter()
        .filter_map(|c| to_record(c, &normalize_opts))
        .collect();
    let (transactions, duplicates) = dedup(records);

    Ok(ImportOutcome {
        report: ImportReport {
            pages: 0,
            lines: lines.len(),
            candidates: candidate_count,
            kept: transactions.len(),
            duplicates,
            strategy,
            year,
        },
        transactions,
    })
}

/// Run a delimited export through the CSV path.
pub fn import_delimited(text: &str, opts: &ImportOptions) -> ImportOutcome {
    let rows = parse_delimited(text);
    let candidates = rows.len();

    let records: Vec<NewTransaction> = rows
        .into_iter()
        .filter_map(|r| build_transaction(r.date, &r.description, r.value, r.kind, false, opts.today))
        .collect();
    let (transactions, duplicates) = dedup(records);

    info!(rows = candidates, kept = transactions.len(), duplicates, "delimited export parsed");
    ImportOutcome {
        report: ImportReport {
            pages: 0,
            lines: text.lines().count(),
            candidates,
            kept: transactions.len(),
            duplicates,
            strategy: "delimited",
            year: None,
        },
        transactions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_file_kind_by_extension() {
        assert_eq!(FileKind::from_path(&PathBuf::from("extrato.CSV")).unwrap(), FileKind::Delimited);
        assert_eq!(FileKind::from_path(&PathBuf::from("extrato.txt")).unwrap(), FileKind::Delimited);
        assert_eq!(FileKind::from_path(&PathBuf::from("extrato.pdf")).unwrap(), FileKind::Document);
        assert_eq!(FileKind::from_path(&PathBuf::from("layer.json")).unwrap(), FileKind::Document);
        let err = FileKind::from_path(&PathBuf::from("extrato.ofx")).unwrap_err();
        assert!(matches!(err, IngestError::UnsupportedFile(_)));
        assert!(!err.is_unreadable());
    }

    #[test]
    fn test_import_delimited_scenario() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let out = import_delimited("15/03/2024;Venda produto;150,00", &ImportOptions::new(today));
        assert_eq!(out.transactions.len(), 1);
        let t = &out.transactions[0];
        assert_eq!(t.date.to_string(), "2024-03-15");
        assert_eq!(t.description, "Venda produto");
        assert_eq!(t.value, 150.0);
        assert_eq!(t.kind, fluxo_core::TransactionType::Income);
        assert!(!t.is_pending());
        assert_eq!(out.report.strategy, "delimited");
    }

    #[test]
    fn test_import_delimited_title_line_and_short_year() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let text = "Extrato Conta Corrente\nData;Descrição;Valor\n15/03/24;Venda produto;150,00\n";
        let out = import_delimited(text, &ImportOptions::new(today));
        assert_eq!(out.transactions.len(), 1);
        assert_eq!(out.transactions[0].date, NaiveDate::from_ymd_opt(2024, 3, 15).unwrap());
        let json = serde_json::to_value(&out.transactions[0]).unwrap();
        assert_eq!(json["date"], "2024-03-15");
    }

    #[test]
    fn test_import_delimited_future_row_is_pending() {
        let today = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let out = import_delimited("2024-03-20;Boleto fornecedor;-80,00", &ImportOptions::new(today));
        assert!(out.transactions[0].is_pending());
        assert_eq!(out.transactions[0].due_date, NaiveDate::from_ymd_opt(2024, 3, 20));
    }
}
