//! Amount notation: Brazilian decimals (`1.234,56`) with an optional
//! credit/debit marker (`C`/`D`) right after the value.

use std::ops::Range;
use std::sync::OnceLock;

use fluxo_core::TransactionType;
use regex::Regex;

const VALUE: &str = r"(?:\d{1,3}(?:\.\d{3})+|\d+),\d{2}";

/// Values anywhere inside a line; the marker may be glued on or one space away.
/// A minus only counts when glued to the digits: `PIX - 50,00` is a separator.
fn inline_value_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(
            r"(?P<sign>-)?\b(?P<value>{VALUE})(?:\s?(?P<marker>[CD])\b)?"
        ))
        .expect("inline value regex")
    })
}

/// A whole token that is a value, e.g. `124,37D` or `-5,00`.
fn value_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"^(?P<sign>-)?(?P<value>{VALUE})(?P<marker>[CD])?$"))
            .expect("value token regex")
    })
}

/// One value occurrence in a row.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueMatch {
    /// Parsed magnitude; NaN when the digits could not be parsed.
    pub value: f64,
    pub marker: Option<TransactionType>,
    /// Printed with a leading minus. Only a fallback hint for the type;
    /// keywords outrank it.
    pub negative: bool,
    /// Byte range of the whole match (sign, value and marker).
    pub span: Range<usize>,
}

impl ValueMatch {
    pub fn is_usable(&self) -> bool {
        self.value.is_finite() && self.value > 0.0
    }
}

/// All values in `text`, in order of appearance.
pub fn find_values(text: &str) -> Vec<ValueMatch> {
    inline_value_re()
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            Some(ValueMatch {
                value: parse_br_decimal(&caps["value"]).unwrap_or(f64::NAN),
                marker: caps
                    .name("marker")
                    .and_then(|m| m.as_str().chars().next())
                    .and_then(TransactionType::from_marker),
                negative: caps.name("sign").is_some(),
                span: whole.range(),
            })
        })
        .collect()
}

/// Parse a token that is entirely a value.
pub fn parse_value_token(token: &str) -> Option<ValueMatch> {
    let caps = value_token_re().captures(token)?;
    Some(ValueMatch {
        value: parse_br_decimal(&caps["value"]).unwrap_or(f64::NAN),
        marker: caps
            .name("marker")
            .and_then(|m| m.as_str().chars().next())
            .and_then(TransactionType::from_marker),
        negative: caps.name("sign").is_some(),
        span: 0..token.len(),
    })
}

/// True for an isolated `C`/`D` token.
pub fn parse_marker_token(token: &str) -> Option<TransactionType> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(c @ ('C' | 'D')), None) => TransactionType::from_marker(c),
        _ => None,
    }
}

/// Among a row's values, prefer the first one with a C/D marker,
/// otherwise the first one.
pub fn pick_value(values: &[ValueMatch]) -> Option<&ValueMatch> {
    values
        .iter()
        .find(|v| v.marker.is_some())
        .or_else(|| values.first())
}

/// `1.234,56` -> 1234.56
pub fn parse_br_decimal(s: &str) -> Option<f64> {
    let normalized = s.trim().replace('.', "").replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse an amount field from a delimited export.
///
/// Accepts `150,00`, `1.234,56`, `1234.56`, `R$ -10,00`. Returns the
/// magnitude and whether it was printed negative.
pub fn parse_signed_amount(raw: &str) -> Option<(f64, bool)> {
    let s: String = raw
        .replace("R$", "")
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '"')
        .collect();
    let (negative, digits) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.as_str()),
    };
    let value = if digits.contains(',') {
        parse_br_decimal(digits)?
    } else {
        digits.parse::<f64>().ok().filter(|v| v.is_finite())?
    };
    Some((value.abs(), negative))
}
