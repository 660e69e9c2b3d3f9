//! Delimited exports (CSV with `;` or `,`).
//!
//! Expected layout, header optional; title lines above the header are skipped:
//!   Data;Descrição;Valor
//!   15/03/2024;Venda produto;150,00
//!   16/03/2024;"Aluguel, sala 2";-900,00
//!
//! Exports are assumed pre-normalized, so the sign alone decides the type:
//! a leading `-` is an expense, anything else income.

use std::sync::OnceLock;

use chrono::{Datelike, NaiveDate};
use fluxo_core::TransactionType;
use regex::Regex;
use tracing::debug;

use crate::amount::parse_signed_amount;

const HEADER_HINTS: &[&str] = &["data", "date", "valor"];

/// Anything earlier is a misread year, not a bank export.
const MIN_EXPORT_YEAR: i32 = 1900;

fn br_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(?P<d>\d{1,2})/(?P<m>\d{1,2})/(?P<y>\d{4}|\d{2})$").expect("export date regex")
    })
}

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?P<y>\d{4})-(?P<m>\d{2})-(?P<d>\d{2})$").expect("iso date regex"))
}

/// One parsed export row.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimitedRow {
    pub date: NaiveDate,
    pub description: String,
    /// Positive magnitude.
    pub value: f64,
    pub kind: TransactionType,
}

/// Where the rows start and how they are split.
struct Layout<'t> {
    body: &'t str,
    delimiter: u8,
}

/// Skip any title lines up to the header (first line naming a date or
/// value column), then sniff the delimiter from the header or, without
/// one, the first line that has a delimiter at all.
fn detect_layout(text: &str) -> Layout<'_> {
    let mut offset = 0;
    let mut header = None;
    for line in text.split_inclusive('\n') {
        let lowered = line.to_lowercase();
        let has_delimiter = line.contains(';') || line.contains(',');
        if has_delimiter && HEADER_HINTS.iter().any(|h| lowered.contains(h)) && !starts_with_date(line) {
            header = Some((line, offset + line.len()));
            break;
        }
        offset += line.len();
    }

    let (body, sample) = match header {
        Some((line, end)) => (&text[end..], Some(line)),
        None => (text, text.lines().find(|l| l.contains(';') || l.contains(','))),
    };
    // Brazilian amounts carry a decimal comma, so `;` wins whenever present.
    let delimiter = match sample {
        Some(line) if line.contains(';') => b';',
        _ => b',',
    };
    Layout { body, delimiter }
}

/// A data row whose description happens to contain a header hint.
fn starts_with_date(line: &str) -> bool {
    line.split([';', ','])
        .next()
        .and_then(|f| parse_export_date(f.trim().trim_matches('"')))
        .is_some()
}

/// Parse a delimited export. Title lines, the header and malformed rows
/// are skipped.
pub fn parse_delimited(text: &str) -> Vec<DelimitedRow> {
    let layout = detect_layout(text);

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(layout.delimiter)
        .trim(csv::Trim::All)
        .from_reader(layout.body.as_bytes());

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                debug!(row = i, error = %e, "skipping unreadable delimited row");
                continue;
            }
        };
        if record.len() < 3 {
            continue;
        }

        let field = |idx: usize| record.get(idx).unwrap_or("").trim_matches('"').trim();

        let Some(date) = parse_export_date(field(0)) else {
            debug!(row = i, raw = field(0), "skipping row with unrecognised date");
            continue;
        };
        let description = field(1).to_string();
        if description.is_empty() {
            continue;
        }
        let Some((value, negative)) = parse_signed_amount(field(2)) else {
            debug!(row = i, raw = field(2), "skipping row with unparseable value");
            continue;
        };
        if value <= 0.0 {
            continue;
        }

        rows.push(DelimitedRow {
            date,
            description,
            value,
            kind: if negative {
                TransactionType::Expense
            } else {
                TransactionType::Income
            },
        });
    }

    rows
}

/// `DD/MM/YYYY`, `DD/MM/YY` (meaning `20YY`) or ISO `YYYY-MM-DD`.
pub fn parse_export_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let caps = br_date_re().captures(raw).or_else(|| iso_date_re().captures(raw))?;
    let num = |name: &str| caps[name].parse::<u32>().ok();

    let year = match &caps["y"] {
        yy if yy.len() == 2 => 2000 + num("y")? as i32,
        _ => num("y")? as i32,
    };
    NaiveDate::from_ymd_opt(year, num("m")?, num("d")?).filter(|d| d.year() >= MIN_EXPORT_YEAR)
}
