// Document ingestion — turning files into raw text.
//
// The TextExtractor trait maps file bytes to page-indexed text. PDFs go
// through lopdf; everything else is read as UTF-8.

pub mod pdf;
pub mod plain;
pub mod traits;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub use pdf::PdfExtractor;
pub use plain::PlainTextExtractor;
pub use traits::TextExtractor;

/// Errors that can occur while pulling text out of a file.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("PDF is encrypted and its text could not be extracted")]
    Encrypted,

    #[error("failed to extract text from page {page}: {source}")]
    Page {
        page: u32,
        #[source]
        source: lopdf::Error,
    },

    #[error("text is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Raw text keyed by 1-based page number.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub pages: BTreeMap<u32, String>,
}

impl PageText {
    /// A single-page document.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            pages: BTreeMap::from([(1, text.into())]),
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All pages in order, separated by newlines so words at page
    /// boundaries don't fuse.
    pub fn text(&self) -> String {
        self.pages
            .values()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether bytes start with the PDF magic header.
pub fn looks_like_pdf(bytes: &[u8]) -> bool {
    bytes.starts_with(b"%PDF-")
}

/// Read a file and extract its text, picking the extractor from the file
/// extension (or the PDF header when the extension is missing).
pub fn extract_path(path: &Path) -> Result<PageText, ExtractionError> {
    let bytes = std::fs::read(path).map_err(|source| ExtractionError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_pdf = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or_else(|| looks_like_pdf(&bytes));

    let extractor: &dyn TextExtractor = if is_pdf {
        &PdfExtractor
    } else {
        &PlainTextExtractor
    };

    let text = extractor.extract(&bytes)?;
    debug!(
        path = %path.display(),
        extractor = extractor.name(),
        pages = text.page_count(),
        "Extracted text"
    );
    Ok(text)
}
