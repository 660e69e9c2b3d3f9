//! Row reconstruction: cluster tokens into visual lines by `y`.
//!
//! Text layers don't keep rows together; tokens on one visual row can drift
//! a few units in `y` with font metrics. Too tight a tolerance splits a row,
//! too loose merges neighbours, so the tolerance comes from the profile.

use crate::types::{PositionedToken, ReconstructedLine};

/// Group one page's tokens into lines, top to bottom.
///
/// Tokens are sorted by `y` descending then `x` ascending; a token joins the
/// current row while `|y - row_reference_y| <= y_tolerance`, where the
/// reference is the row's first token. Each finished row is re-sorted by `x`.
pub fn reconstruct_lines(mut tokens: Vec<PositionedToken>, y_tolerance: f64) -> Vec<ReconstructedLine> {
    tokens.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

    let mut lines = Vec::new();
    let mut current: Vec<PositionedToken> = Vec::new();

    for token in tokens {
        let joins = current
            .first()
            .is_some_and(|first| (token.y - first.y).abs() <= y_tolerance);
        if !joins && !current.is_empty() {
            lines.push(finish_row(std::mem::take(&mut current)));
        }
        current.push(token);
    }
    if !current.is_empty() {
        lines.push(finish_row(current));
    }

    lines
}

fn finish_row(mut tokens: Vec<PositionedToken>) -> ReconstructedLine {
    tokens.sort_by(|a, b| a.x.total_cmp(&b.x));
    ReconstructedLine { tokens }
}
