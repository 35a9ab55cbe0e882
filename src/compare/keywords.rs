// Frequency-ranked keyword extraction.
//
// A keyword is a content-bearing token: a noun, proper noun, or adjective
// that is neither a stop word nor punctuation. Counting is exact and
// case-sensitive — "Apple" and "apple" are different keywords.

use std::collections::HashMap;

use serde::Serialize;

use crate::document::{AnnotatedDocument, Token};

/// Number of keywords kept per document when nothing else is configured.
pub const DEFAULT_TOP_N: usize = 10;

/// A keyword and how many times it occurs in a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeywordCount {
    pub keyword: String,
    pub count: usize,
}

/// Extracts the top-N most frequent keywords from an annotated document.
#[derive(Debug, Clone, Copy)]
pub struct KeywordExtractor {
    top_n: usize,
}

impl Default for KeywordExtractor {
    fn default() -> Self {
        Self {
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl KeywordExtractor {
    /// Panics if `top_n` is zero.
    pub fn new(top_n: usize) -> Self {
        assert!(top_n > 0, "top_n must be at least 1");
        Self { top_n }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Ranked keywords, most frequent first. Ties keep first-occurrence order.
    pub fn extract(&self, doc: &AnnotatedDocument) -> Vec<KeywordCount> {
        // Counts live in encounter order; the index only points into it.
        let mut ranked: Vec<KeywordCount> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for token in doc.tokens().iter().filter(|t| is_keyword(t)) {
            match index.get(token.text.as_str()) {
                Some(&i) => ranked[i].count += 1,
                None => {
                    index.insert(token.text.as_str(), ranked.len());
                    ranked.push(KeywordCount {
                        keyword: token.text.clone(),
                        count: 1,
                    });
                }
            }
        }

        // sort_by is stable, so equal counts stay in first-occurrence order
        ranked.sort_by(|a, b| b.count.cmp(&a.count));
        ranked.truncate(self.top_n);
        ranked
    }
}

/// Whether a token survives the keyword filter.
pub fn is_keyword(token: &Token) -> bool {
    !token.is_stop && !token.is_punct && token.pos.is_content()
}
