//! Line strategy: regex over each reconstructed line's joined text.
//!
//! Expected rows after line reconstruction:
//!   14/11 PIX REC.OUTRA IF MT 1,00C
//!   08/12 PIX EMIT.OUTRA IF 124,37 D
//!   09/12 PIX ENV JOAO DA SILVA          <- wrapped, value on next row
//!         CPF ***.123.456-** 50,00D

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::{GrammarContext, LineParsingStrategy};
use crate::amount::find_values;
use crate::types::{CandidateDate, ParsedCandidate, ReconstructedLine};

fn row_start_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?P<date>\d{2}/\d{2}(?:/\d{2})?)(?:\s+(?P<rest>.*))?$").expect("row start regex")
    })
}

/// Split a line into its leading `DD/MM[/YY]` and the rest.
fn split_leading_date(line: &str) -> Option<(CandidateDate, &str)> {
    let caps = row_start_re().captures(line)?;
    let date = CandidateDate::parse(&caps["date"])?;
    let rest = caps.name("rest").map_or("", |m| m.as_str());
    Some((date, rest))
}

/// A dated row still waiting for its value.
struct Pending {
    date: CandidateDate,
    text: String,
    is_future: bool,
}

enum Step {
    Done(Option<ParsedCandidate>),
    NeedMore(Pending),
}

pub struct LineRegexStrategy;

impl LineRegexStrategy {
    fn step(&self, pending: Pending, ctx: &GrammarContext<'_>) -> Step {
        let values = find_values(&pending.text);
        if values.is_empty() {
            return Step::NeedMore(pending);
        }

        // The description is the row minus every value it printed.
        let mut description = String::with_capacity(pending.text.len());
        let mut last = 0;
        for v in &values {
            description.push_str(&pending.text[last..v.span.start]);
            description.push(' ');
            last = v.span.end;
        }
        description.push_str(&pending.text[last..]);

        Step::Done(ctx.finish(pending.date, &description, &values, pending.is_future))
    }
}

impl LineParsingStrategy for LineRegexStrategy {
    fn parse(&self, lines: &[ReconstructedLine], ctx: &GrammarContext<'_>) -> Vec<ParsedCandidate> {
        let mut out = Vec::new();
        let mut in_future = false;
        let mut pending: Option<Pending> = None;

        for line in lines {
            let text = line.text();

            if ctx.is_future_header(&text) {
                in_future = true;
                pending = None;
                continue;
            }
            if ctx.is_skip_line(&text) {
                pending = None;
                continue;
            }

            let next = if let Some((date, rest)) = split_leading_date(&text) {
                if let Some(dropped) = pending.take() {
                    debug!(date = %dropped.date, "wrapped row ended without a value");
                }
                Pending {
                    date,
                    text: rest.to_string(),
                    is_future: in_future,
                }
            } else if let Some(mut p) = pending.take() {
                p.text.push(' ');
                p.text.push_str(&text);
                if p.text.chars().count() > ctx.profile.max_continuation_chars {
                    debug!(date = %p.date, "wrapped row too long; dropping");
                    continue;
                }
                p
            } else {
                continue;
            };

            match self.step(next, ctx) {
                Step::Done(Some(candidate)) => out.push(candidate),
                Step::Done(None) => {}
                Step::NeedMore(p) => pending = Some(p),
            }
        }

        if let Some(dropped) = pending {
            debug!(date = %dropped.date, "statement ended inside a row without a value");
        }
        out
    }

    fn name(&self) -> &'static str {
        "line"
    }
}
