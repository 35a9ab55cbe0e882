// Language model trait — swap-ready abstraction.
//
// The comparison engine never tokenizes or tags text itself. It asks a
// LanguageModel for an AnnotatedDocument and for the similarity between two
// of them. The default implementation is the rule-based lexical model; the
// embedding model swaps in a sentence-transformer vector space.

use anyhow::Result;

use crate::document::{AnnotatedDocument, SimilarityUnavailable};

/// Trait for turning raw text into annotated documents.
pub trait LanguageModel: Send + Sync {
    /// Short identifier used in logs and output.
    fn name(&self) -> &str;

    /// Tokenize, tag, and run entity recognition over a text.
    fn annotate(&self, text: &str) -> Result<AnnotatedDocument>;

    /// Semantic similarity between two documents this model annotated.
    /// Default implementation compares the documents' vectors.
    fn similarity(
        &self,
        a: &AnnotatedDocument,
        b: &AnnotatedDocument,
    ) -> Result<f64, SimilarityUnavailable> {
        a.similarity(b)
    }
}
