// Plain UTF-8 text — the whole file is one page.

use super::traits::TextExtractor;
use super::{ExtractionError, PageText};

pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn name(&self) -> &str {
        "text"
    }

    fn extract(&self, bytes: &[u8]) -> Result<PageText, ExtractionError> {
        let text = String::from_utf8(bytes.to_vec())?;
        // Byte order marks aren't content
        let text = text.strip_prefix('\u{feff}').unwrap_or(&text).to_string();
        Ok(PageText::single(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page() {
        let text = PlainTextExtractor.extract("two\nlines".as_bytes()).unwrap();
        assert_eq!(text.page_count(), 1);
        assert_eq!(text.text(), "two\nlines");
    }

    #[test]
    fn test_strips_bom() {
        let text = PlainTextExtractor.extract("\u{feff}body".as_bytes()).unwrap();
        assert_eq!(text.text(), "body");
    }

    #[test]
    fn test_invalid_utf8() {
        let err = PlainTextExtractor.extract(&[0xff, 0xfe, 0xfd]).unwrap_err();
        assert!(matches!(err, ExtractionError::Encoding(_)));
    }
}
