//! Token strategy: a state machine over the token stream.
//!
//! A `DD/MM` token opens a transaction, following tokens accumulate as the
//! description until a value token, and an isolated `C`/`D` right after the
//! value is merged onto it. Row boundaries only matter for two things:
//! header/skip detection and collecting several values printed on one row.

use std::mem;

use tracing::debug;

use super::{GrammarContext, LineParsingStrategy};
use crate::amount::{ValueMatch, parse_marker_token, parse_value_token};
use crate::types::{CandidateDate, ParsedCandidate, ReconstructedLine};

#[derive(Debug)]
enum State {
    Seeking,
    InDescription {
        date: CandidateDate,
        parts: Vec<String>,
        len: usize,
        is_future: bool,
    },
    AwaitingSuffix {
        date: CandidateDate,
        parts: Vec<String>,
        is_future: bool,
        values: Vec<ValueMatch>,
        row: usize,
    },
}

fn date_token(token: &str) -> Option<CandidateDate> {
    CandidateDate::parse(token)
}

pub struct TokenStreamStrategy;

struct Machine<'c, 'p> {
    ctx: &'c GrammarContext<'p>,
    state: State,
    in_future: bool,
    out: Vec<ParsedCandidate>,
}

impl Machine<'_, '_> {
    /// Emit an in-flight candidate that already has a value; drop one that doesn't.
    fn close(&mut self) {
        match mem::replace(&mut self.state, State::Seeking) {
            State::AwaitingSuffix {
                date,
                parts,
                is_future,
                values,
                ..
            } => {
                if let Some(c) = self.ctx.finish(date, &parts.join(" "), &values, is_future) {
                    self.out.push(c);
                }
            }
            State::InDescription { date, .. } => {
                debug!(%date, "row ended without a value");
            }
            State::Seeking => {}
        }
    }

    fn feed(&mut self, token: &str, row: usize) {
        loop {
            match &mut self.state {
                State::Seeking => {
                    if let Some(date) = date_token(token) {
                        self.state = State::InDescription {
                            date,
                            parts: Vec::new(),
                            len: 0,
                            is_future: self.in_future,
                        };
                    }
                    return;
                }
                State::InDescription {
                    date,
                    parts,
                    len,
                    is_future,
                } => {
                    if date_token(token).is_some() {
                        self.close();
                        continue;
                    }
                    if let Some(value) = parse_value_token(token) {
                        self.state = State::AwaitingSuffix {
                            date: *date,
                            parts: mem::take(parts),
                            is_future: *is_future,
                            values: vec![value],
                            row,
                        };
                        return;
                    }
                    *len += token.chars().count() + 1;
                    if *len > self.ctx.profile.max_continuation_chars {
                        debug!(date = %date, "description too long; dropping row");
                        self.state = State::Seeking;
                        return;
                    }
                    parts.push(token.to_string());
                    return;
                }
                State::AwaitingSuffix {
                    values, row: vrow, ..
                } => {
                    if let Some(marker) = parse_marker_token(token) {
                        let last = values.last_mut().filter(|v| v.marker.is_none());
                        if let Some(last) = last {
                            last.marker = Some(marker);
                            self.close();
                            return;
                        }
                    } else if *vrow == row {
                        if let Some(value) = parse_value_token(token) {
                            values.push(value);
                            return;
                        }
                    }
                    // Anything else ends the transaction and is read afresh.
                    self.close();
                    continue;
                }
            }
        }
    }
}

impl LineParsingStrategy for TokenStreamStrategy {
    fn parse(&self, lines: &[ReconstructedLine], ctx: &GrammarContext<'_>) -> Vec<ParsedCandidate> {
        let mut m = Machine {
            ctx,
            state: State::Seeking,
            in_future: false,
            out: Vec::new(),
        };

        for (row, line) in lines.iter().enumerate() {
            let text = line.text();
            if ctx.is_future_header(&text) {
                m.close();
                m.in_future = true;
                continue;
            }
            if ctx.is_skip_line(&text) {
                m.close();
                continue;
            }
            for token in &line.tokens {
                m.feed(&token.text, row);
            }
        }
        m.close();

        m.out
    }

    fn name(&self) -> &'static str {
        "token"
    }
}
