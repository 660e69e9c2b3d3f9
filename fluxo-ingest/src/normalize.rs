//! Candidate normalization: year completion, description cleanup, status
//! derivation and dedup, in that order.
//!
//! Dedup runs on completed dates; comparing raw `DD/MM` would merge rows
//! from different years.

use std::collections::HashSet;

use chrono::{Datelike, NaiveDate};
use fluxo_core::{MAX_DESCRIPTION_LEN, NewTransaction, TransactionType};
use tracing::debug;

use crate::types::{CandidateDate, ParsedCandidate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Statement year for rows printed as `DD/MM`.
    pub year: i32,
    /// Processing date; anything after it is pending.
    pub today: NaiveDate,
}

/// Normalize candidates into store records, dropping duplicates.
pub fn normalize(candidates: Vec<ParsedCandidate>, opts: &NormalizeOptions) -> Vec<NewTransaction> {
    let records = candidates.into_iter().filter_map(|c| to_record(c, opts)).collect();
    dedup(records).0
}

/// Year completion, description cleanup and status for one candidate.
pub fn to_record(candidate: ParsedCandidate, opts: &NormalizeOptions) -> Option<NewTransaction> {
    let Some(date) = complete_date(&candidate.date, candidate.is_future, opts) else {
        debug!(date = %candidate.date, description = %candidate.description, "skipping row with impossible date");
        return None;
    };
    build_transaction(
        date,
        &candidate.description,
        candidate.value,
        candidate.kind,
        candidate.is_future,
        opts.today,
    )
}

/// `DD/MM[/YY]` into a calendar date.
///
/// A `/YY` suffix means `20YY` and beats the statement year. Future rows
/// without their own year that fall before today's month/day roll into the
/// next year (statements printed in December listing January debits).
pub fn complete_date(date: &CandidateDate, is_future: bool, opts: &NormalizeOptions) -> Option<NaiveDate> {
    if let Some(yy) = date.year_suffix {
        return NaiveDate::from_ymd_opt(2000 + yy as i32, date.month, date.day);
    }

    let resolved = NaiveDate::from_ymd_opt(opts.year, date.month, date.day)?;
    if is_future && (date.month, date.day) < (opts.today.month(), opts.today.day()) {
        return NaiveDate::from_ymd_opt(opts.year + 1, date.month, date.day).or(Some(resolved));
    }
    Some(resolved)
}

/// Collapse whitespace, strip symbol noise (accented letters are kept) and
/// truncate to [`MAX_DESCRIPTION_LEN`] characters.
pub fn finalize_description(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .map(|c| if is_description_char(c) { c } else { ' ' })
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .chars()
        .take(MAX_DESCRIPTION_LEN)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn is_description_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '.' | ',' | '-' | '/' | '&' | '*' | ':' | '(' | ')' | '\'' | '#' | '@' | '+')
}

/// Build one store record; `None` when the value or description is unusable.
///
/// Status is pending, due on its own date, when the row came from a future
/// section or its date is after `today`.
pub fn build_transaction(
    date: NaiveDate,
    description: &str,
    value: f64,
    kind: TransactionType,
    is_future: bool,
    today: NaiveDate,
) -> Option<NewTransaction> {
    if !value.is_finite() || value <= 0.0 {
        debug!(%date, value, "skipping row with non-positive value");
        return None;
    }
    let description = finalize_description(description);
    if description.is_empty() {
        debug!(%date, "skipping row with empty description");
        return None;
    }

    let record = NewTransaction::imported(date, description, value, kind);
    if is_future || date > today {
        Some(record.into_pending())
    } else {
        Some(record)
    }
}

/// Keep the first of each `(date, description, value, type)`.
///
/// Returns the survivors and how many were dropped.
pub fn dedup(records: Vec<NewTransaction>) -> (Vec<NewTransaction>, usize) {
    let mut seen = HashSet::new();
    let before = records.len();
    let kept: Vec<NewTransaction> = records
        .into_iter()
        .filter(|r| seen.insert((r.date, r.description.clone(), r.value_cents(), r.kind)))
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}
