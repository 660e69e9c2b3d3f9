//! PDF text layer via pdf_oxide.

use std::future::{self, Future};
use std::path::Path;

use fluxo_ingest::{IngestError, PageSource, RawFragment};
use pdf_oxide::PdfDocument;

pub struct PdfPages {
    doc: PdfDocument,
    pages: usize,
}

impl PdfPages {
    pub fn open(path: &Path) -> fluxo_ingest::Result<Self> {
        let mut doc = PdfDocument::open(path).map_err(|e| IngestError::Document(e.to_string()))?;
        let pages = doc
            .page_count()
            .map_err(|e| IngestError::Document(e.to_string()))?;
        Ok(Self { doc, pages })
    }
}

impl PageSource for PdfPages {
    type Error = pdf_oxide::Error;

    fn page_count(&self) -> usize {
        self.pages
    }

    fn text_fragments(
        &mut self,
        page_index: usize,
    ) -> impl Future<Output = Result<Vec<RawFragment>, Self::Error>> {
        // Span boxes are in PDF user space (y grows upwards), same as the
        // fragment transform.
        let spans = self.doc.extract_spans(page_index).map(|spans| {
            spans
                .into_iter()
                .map(|s| RawFragment::positioned(s.text, s.bbox.x as f64, s.bbox.y as f64))
                .collect()
        });
        future::ready(spans)
    }
}
