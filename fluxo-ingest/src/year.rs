//! Statement year resolution.
//!
//! Rows usually print `DD/MM` only. The year comes from the first full
//! `DD/MM/YYYY` date in the document (normally the header's period field)
//! and applies to the whole statement. Rows that carry their own `/YY`
//! override it during normalization.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;

fn full_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\b(\d{2})/(\d{2})/(\d{4})\b").expect("full date regex"))
}

/// Year of the first valid `DD/MM/YYYY` date across `lines`, in order.
pub fn resolve_statement_year<'a>(lines: impl IntoIterator<Item = &'a str>) -> Option<i32> {
    lines.into_iter().find_map(|line| {
        full_date_re().captures_iter(line).find_map(|caps| {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day).map(|_| year)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_full_date_wins() {
        let lines = [
            "EXTRATO CONTA CORRENTE",
            "Período: 01/11/2024 a 30/11/2024",
            "Emitido em 02/01/2025",
        ];
        assert_eq!(resolve_statement_year(lines), Some(2024));
    }

    #[test]
    fn test_ignores_short_dates_and_invalid_dates() {
        let lines = ["14/11 PIX REC 1,00C", "Ref 99/99/2030", "Gerado 05/03/2023"];
        assert_eq!(resolve_statement_year(lines), Some(2023));
    }

    #[test]
    fn test_none_without_full_date() {
        assert_eq!(resolve_statement_year(["10/01 TARIFA 5,00D"]), None);
    }
}
