//! Transaction grammar: turn reconstructed lines into candidates.
//!
//! Two strategies share one context (profile, future-section state rules,
//! candidate validation):
//!
//! - [`LineRegexStrategy`]: regex over each line's joined text
//! - [`TokenStreamStrategy`]: state machine over the token stream, independent
//!   of line boundaries
//!
//! Both must see the whole document at once: a future section, once opened,
//! runs to the end of the statement.

mod line_regex;
mod token_stream;

pub use line_regex::LineRegexStrategy;
pub use token_stream::TokenStreamStrategy;

use std::fmt;
use std::str::FromStr;

use regex::RegexSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::amount::{ValueMatch, pick_value};
use crate::classify::{TypeSource, resolve_type};
use crate::error::Result;
use crate::normalize::finalize_description;
use crate::profile::StatementProfile;
use crate::types::{CandidateDate, ParsedCandidate, ReconstructedLine};

/// Trait for parsing a statement's lines into transaction candidates.
pub trait LineParsingStrategy {
    fn parse(&self, lines: &[ReconstructedLine], ctx: &GrammarContext<'_>) -> Vec<ParsedCandidate>;

    /// Return the name of this strategy for logs and reports.
    fn name(&self) -> &'static str;
}

/// Profile-derived state shared by the strategies.
pub struct GrammarContext<'a> {
    pub profile: &'a StatementProfile,
    future_headers: RegexSet,
}

impl<'a> GrammarContext<'a> {
    pub fn new(profile: &'a StatementProfile) -> Result<Self> {
        profile.validate()?;
        Ok(Self {
            profile,
            future_headers: profile.future_section_matcher()?,
        })
    }

    pub fn is_future_header(&self, line: &str) -> bool {
        self.future_headers.is_match(line)
    }

    pub fn is_skip_line(&self, line: &str) -> bool {
        self.profile.is_skip_line(line)
    }

    /// Validate and type one candidate.
    ///
    /// `values` are every value seen in the row; the marked one wins,
    /// otherwise the first.
    pub(crate) fn finish(
        &self,
        date: CandidateDate,
        description: &str,
        values: &[ValueMatch],
        is_future: bool,
    ) -> Option<ParsedCandidate> {
        let chosen = pick_value(values)?;
        if !chosen.is_usable() {
            debug!(%date, description, "skipping row with unusable value");
            return None;
        }

        let description = description.split_whitespace().collect::<Vec<_>>().join(" ");
        let cleaned_len = finalize_description(&description).chars().count();
        if cleaned_len < self.profile.min_description_len {
            debug!(%date, %description, "skipping row with too short a description");
            return None;
        }
        if self.is_skip_line(&description) {
            debug!(%date, %description, "skipping balance/metadata row");
            return None;
        }

        let resolution = resolve_type(chosen.marker, chosen.negative, &description, self.profile);
        Some(ParsedCandidate {
            date,
            description,
            value: chosen.value,
            kind: resolution.kind,
            type_source: resolution.source,
            is_future,
        })
    }
}

/// Which strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyChoice {
    Line,
    Token,
    /// Run both and keep whichever yields more candidates; ties go to `Line`.
    #[default]
    Auto,
}

impl FromStr for StrategyChoice {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "line" => Ok(Self::Line),
            "token" => Ok(Self::Token),
            "auto" => Ok(Self::Auto),
            other => Err(format!("unknown strategy: {other} (expected line, token or auto)")),
        }
    }
}

impl fmt::Display for StrategyChoice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Line => "line",
            Self::Token => "token",
            Self::Auto => "auto",
        })
    }
}

/// Parse with the chosen strategy, returning the candidates and the name of
/// the strategy that produced them.
///
/// Rows typed by the profile default are logged here, once, for the
/// strategy that was kept.
pub fn parse_candidates(
    lines: &[ReconstructedLine],
    ctx: &GrammarContext<'_>,
    choice: StrategyChoice,
) -> (Vec<ParsedCandidate>, &'static str) {
    let (candidates, name) = select(lines, ctx, choice);
    for c in candidates.iter().filter(|c| c.type_source == TypeSource::Default) {
        warn!(
            date = %c.date,
            description = %c.description,
            assumed = c.kind.as_str(),
            "no credit/debit marker or keyword; using profile default"
        );
    }
    (candidates, name)
}

fn select(
    lines: &[ReconstructedLine],
    ctx: &GrammarContext<'_>,
    choice: StrategyChoice,
) -> (Vec<ParsedCandidate>, &'static str) {
    match choice {
        StrategyChoice::Line => run(&LineRegexStrategy, lines, ctx),
        StrategyChoice::Token => run(&TokenStreamStrategy, lines, ctx),
        StrategyChoice::Auto => {
            let by_line = run(&LineRegexStrategy, lines, ctx);
            let by_token = run(&TokenStreamStrategy, lines, ctx);
            debug!(
                line = by_line.0.len(),
                token = by_token.0.len(),
                "auto strategy candidate counts"
            );
            if by_token.0.len() > by_line.0.len() {
                by_token
            } else {
                by_line
            }
        }
    }
}

fn run(
    strategy: &dyn LineParsingStrategy,
    lines: &[ReconstructedLine],
    ctx: &GrammarContext<'_>,
) -> (Vec<ParsedCandidate>, &'static str) {
    (strategy.parse(lines, ctx), strategy.name())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::types::{PositionedToken, ReconstructedLine};

    /// One line per string, one token per whitespace-separated word.
    pub fn lines(rows: &[&str]) -> Vec<ReconstructedLine> {
        rows.iter()
            .enumerate()
            .map(|(i, row)| ReconstructedLine {
                tokens: row
                    .split_whitespace()
                    .enumerate()
                    .map(|(j, w)| PositionedToken::new(w, 10.0 + 40.0 * j as f64, 800.0 - 12.0 * i as f64))
                    .collect(),
            })
            .collect()
    }
}
