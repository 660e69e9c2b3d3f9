//! Page text extraction: raw text-layer fragments into positioned tokens.

use serde::{Deserialize, Serialize};

use crate::types::PositionedToken;

/// One text-layer fragment as handed over by the page decoder.
///
/// `transform` is the fragment's 6-element affine matrix `[a, b, c, d, e, f]`;
/// `e` and `f` are the translation (x, y).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawFragment {
    pub text: String,
    #[serde(default)]
    pub transform: Vec<f64>,
}

impl RawFragment {
    /// A fragment with an identity matrix translated to (x, y).
    pub fn positioned(text: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            text: text.into(),
            transform: vec![1.0, 0.0, 0.0, 1.0, x, y],
        }
    }

    fn origin(&self) -> (f64, f64) {
        match self.transform.as_slice() {
            [_, _, _, _, x, y] if x.is_finite() && y.is_finite() => (*x, *y),
            _ => (0.0, 0.0),
        }
    }
}

/// Normalize a page's fragments into tokens.
///
/// Non-breaking spaces become plain spaces, text is trimmed and empty
/// fragments are dropped. Order is left as given.
pub fn extract_tokens(fragments: &[RawFragment]) -> Vec<PositionedToken> {
    fragments
        .iter()
        .filter_map(|frag| {
            let text = frag.text.replace(['\u{00A0}', '\u{202F}'], " ");
            let text = text.trim();
            if text.is_empty() {
                return None;
            }
            let (x, y) = frag.origin();
            Some(PositionedToken::new(text, x, y))
        })
        .collect()
}
