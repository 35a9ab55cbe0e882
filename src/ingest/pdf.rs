// PDF text extraction via lopdf.

use std::collections::BTreeMap;

use lopdf::Document;
use tracing::{debug, warn};

use super::traits::TextExtractor;
use super::{ExtractionError, PageText};

/// Extracts text page by page from a PDF.
pub struct PdfExtractor;

impl TextExtractor for PdfExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn extract(&self, bytes: &[u8]) -> Result<PageText, ExtractionError> {
        let doc = Document::load_mem(bytes)?;
        let encrypted = doc.is_encrypted();

        let mut pages = BTreeMap::new();
        for page in doc.get_pages().into_keys() {
            match doc.extract_text(&[page]) {
                Ok(text) => {
                    pages.insert(page, text);
                }
                Err(_) if encrypted => return Err(ExtractionError::Encrypted),
                Err(source) => return Err(ExtractionError::Page { page, source }),
            }
        }

        if pages.is_empty() {
            warn!("PDF has no pages");
        }
        debug!(pages = pages.len(), encrypted, "Extracted PDF text");

        Ok(PageText { pages })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_is_malformed() {
        let err = PdfExtractor.extract(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionError::Pdf(_)), "got {err:?}");
    }

    #[test]
    fn test_empty_input_is_malformed() {
        assert!(PdfExtractor.extract(&[]).is_err());
    }
}
