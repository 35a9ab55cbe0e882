// Text extractor trait — one implementation per input format.

use super::{ExtractionError, PageText};

/// Trait for extracting raw text from file contents.
pub trait TextExtractor {
    /// Short identifier used in logs.
    fn name(&self) -> &str;

    /// Extract page-indexed text from the raw bytes of a file.
    fn extract(&self, bytes: &[u8]) -> Result<PageText, ExtractionError>;
}
