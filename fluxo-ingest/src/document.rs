//! Page sources: the decoding collaborator behind the PDF pipeline.

use std::convert::Infallible;
use std::fmt;
use std::future::{self, Future};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::fragments::RawFragment;

/// A decoded document, read one page at a time.
///
/// Fetching a page's text layer may suspend (decoders are I/O bound); pages
/// are always requested in order, `0..page_count()`.
pub trait PageSource {
    type Error: fmt::Display;

    fn page_count(&self) -> usize;

    /// Text fragments of one page (0-indexed).
    fn text_fragments(
        &mut self,
        page_index: usize,
    ) -> impl Future<Output = std::result::Result<Vec<RawFragment>, Self::Error>>;
}

/// An already-decoded text layer, e.g. a JSON dump:
/// `{"pages": [[{"text": "14/11", "transform": [1,0,0,1,42,700]}]]}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryDocument {
    pub pages: Vec<Vec<RawFragment>>,
}

impl MemoryDocument {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Lay plain text out as a text layer: one page per string, one row per
    /// line, one fragment per whitespace-separated word.
    pub fn from_text_pages(pages: &[&str]) -> Self {
        let pages = pages
            .iter()
            .map(|page| {
                page.lines()
                    .enumerate()
                    .flat_map(|(row, line)| {
                        let y = 800.0 - 14.0 * row as f64;
                        line.split_whitespace()
                            .enumerate()
                            .map(move |(col, word)| RawFragment::positioned(word, 20.0 + 45.0 * col as f64, y))
                    })
                    .collect()
            })
            .collect();
        Self { pages }
    }
}

impl PageSource for MemoryDocument {
    type Error = Infallible;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn text_fragments(
        &mut self,
        page_index: usize,
    ) -> impl Future<Output = std::result::Result<Vec<RawFragment>, Self::Error>> {
        future::ready(Ok(self.pages.get(page_index).cloned().unwrap_or_default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_dump() {
        let doc = MemoryDocument::from_json(
            r#"{"pages": [[{"text": "14/11", "transform": [1,0,0,1,42,700]}, {"text": "PIX"}], []]}"#,
        )
        .unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.pages[0][0].transform[4], 42.0);
        assert!(doc.pages[0][1].transform.is_empty());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(MemoryDocument::from_json("%PDF-1.7").is_err());
    }

    #[test]
    fn test_from_text_pages_layout() {
        let doc = MemoryDocument::from_text_pages(&["10/01 TARIFA 5,00D\n11/01 PIX 1,00C"]);
        let page = &doc.pages[0];
        assert_eq!(page.len(), 6);
        assert_eq!(page[0].transform[5], page[2].transform[5]);
        assert!(page[3].transform[5] < page[0].transform[5]);
    }
}
