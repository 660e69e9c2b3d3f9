//! fluxo-ingest: bank statement extraction (PDF text layer and delimited exports)
//! into the store's new-transaction shape.
//!
//! PDF pipeline, leaf first:
//! fragments -> lines -> year -> grammar -> normalize.
//! Delimited exports take the single-pass `delimited` path and converge in `normalize`.

pub mod amount;
pub mod classify;
pub mod delimited;
pub mod document;
pub mod error;
pub mod fragments;
pub mod grammar;
pub mod import;
pub mod lines;
pub mod normalize;
pub mod profile;
pub mod types;
pub mod year;

pub use document::{MemoryDocument, PageSource};
pub use error::{IngestError, Result};
pub use fragments::RawFragment;
pub use grammar::{LineParsingStrategy, LineRegexStrategy, StrategyChoice, TokenStreamStrategy};
pub use import::{FileKind, ImportOptions, ImportOutcome, ImportReport, import_delimited, import_document};
pub use profile::StatementProfile;
pub use types::{CandidateDate, ParsedCandidate, PositionedToken, ReconstructedLine};
