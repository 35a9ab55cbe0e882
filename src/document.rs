// AnnotatedDocument — the linguistic view of a text that the comparison
// engine consumes.
//
// A language model produces these; the engine only reads them. Fields are
// private so a document can't be altered after annotation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Universal Dependencies part-of-speech tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PartOfSpeech {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    X,
}

impl PartOfSpeech {
    /// Content-bearing tags: the only ones that can become keywords.
    pub fn is_content(self) -> bool {
        matches!(self, Self::Noun | Self::Propn | Self::Adj)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Adj => "ADJ",
            Self::Adp => "ADP",
            Self::Adv => "ADV",
            Self::Aux => "AUX",
            Self::Cconj => "CCONJ",
            Self::Det => "DET",
            Self::Intj => "INTJ",
            Self::Noun => "NOUN",
            Self::Num => "NUM",
            Self::Part => "PART",
            Self::Pron => "PRON",
            Self::Propn => "PROPN",
            Self::Punct => "PUNCT",
            Self::Sconj => "SCONJ",
            Self::Sym => "SYM",
            Self::Verb => "VERB",
            Self::X => "X",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single token with its annotations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    /// Surface text exactly as it appeared in the source
    pub text: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_punct: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: PartOfSpeech, is_stop: bool, is_punct: bool) -> Self {
        Self {
            text: text.into(),
            pos,
            is_stop,
            is_punct,
        }
    }
}

/// Coarse entity category. Informational only — comparison uses surface text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityLabel {
    /// A person, organization, or place
    Name,
    /// A number, date, or amount
    Quantity,
    /// Anything else the recognizer reports (emails, URLs, ...)
    Other,
}

impl fmt::Display for EntityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Name => "NAME",
            Self::Quantity => "QUANTITY",
            Self::Other => "OTHER",
        };
        f.write_str(s)
    }
}

/// A named-entity span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntitySpan {
    pub text: String,
    pub label: EntityLabel,
}

impl EntitySpan {
    pub fn new(text: impl Into<String>, label: EntityLabel) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }
}

/// Which side of a comparison a document sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    First,
    Second,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::First => f.write_str("first"),
            Side::Second => f.write_str("second"),
        }
    }
}

/// The similarity of two documents could not be computed.
///
/// This is distinct from a score of 0.0, which means the documents were
/// compared and share nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimilarityUnavailable {
    #[error("the {side} document has no semantic vector (no content to compare)")]
    MissingVector { side: Side },

    #[error("the {side} document's semantic vector has zero magnitude")]
    ZeroMagnitude { side: Side },

    #[error("semantic vectors have different dimensions ({left} vs {right}); were both documents annotated by the same model?")]
    DimensionMismatch { left: usize, right: usize },
}

/// Text plus linguistic annotations, produced by a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedDocument {
    tokens: Vec<Token>,
    entities: Vec<EntitySpan>,
    vector: Option<Vec<f64>>,
}

impl AnnotatedDocument {
    pub fn new(tokens: Vec<Token>, entities: Vec<EntitySpan>, vector: Option<Vec<f64>>) -> Self {
        Self {
            tokens,
            entities,
            vector,
        }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn entities(&self) -> &[EntitySpan] {
        &self.entities
    }

    /// The semantic vector, if the model could build one for this text.
    pub fn vector(&self) -> Option<&[f64]> {
        self.vector.as_deref()
    }

    /// Replace the semantic vector, keeping the token and entity annotations.
    ///
    /// Used by models that layer a different vector space over an existing
    /// annotation.
    pub fn with_vector(self, vector: Option<Vec<f64>>) -> Self {
        Self { vector, ..self }
    }

    /// Cosine similarity between the two documents' semantic vectors,
    /// clamped to 0.0..=1.0.
    pub fn similarity(&self, other: &AnnotatedDocument) -> Result<f64, SimilarityUnavailable> {
        let a = self
            .vector()
            .filter(|v| !v.is_empty())
            .ok_or(SimilarityUnavailable::MissingVector { side: Side::First })?;
        let b = other
            .vector()
            .filter(|v| !v.is_empty())
            .ok_or(SimilarityUnavailable::MissingVector { side: Side::Second })?;

        cosine_similarity(a, b)
    }
}

/// Cosine similarity between two dense vectors, clamped to 0.0..=1.0.
///
/// Unlike a plain cosine helper, degenerate input is an error rather than a
/// silent 0.0.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, SimilarityUnavailable> {
    if a.len() != b.len() {
        return Err(SimilarityUnavailable::DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_a < f64::EPSILON {
        return Err(SimilarityUnavailable::ZeroMagnitude { side: Side::First });
    }
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();
    if mag_b < f64::EPSILON {
        return Err(SimilarityUnavailable::ZeroMagnitude { side: Side::Second });
    }

    // Rounding can leave a vector's cosine with itself just under 1.0
    if a == b {
        return Ok(1.0);
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    Ok((dot / (mag_a * mag_b)).clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc_with_vector(vector: Option<Vec<f64>>) -> AnnotatedDocument {
        AnnotatedDocument::new(Vec::new(), Vec::new(), vector)
    }

    #[test]
    fn test_cosine_identical() {
        let a = vec![0.3, 0.1, 0.7];
        assert_eq!(cosine_similarity(&a, &a).unwrap(), 1.0);
        assert_eq!(cosine_similarity(&a, &a.clone()).unwrap(), 1.0);
    }

    #[test]
    fn test_cosine_parallel_close_to_one() {
        let sim = cosine_similarity(&[0.3, 0.1, 0.7], &[0.6, 0.2, 1.4]).unwrap();
        assert!((sim - 1.0).abs() < 1e-9, "Expected ~1.0, got {sim}");
    }

    #[test]
    fn test_document_self_similarity_is_exact() {
        let doc = doc_with_vector(Some(vec![0.3, 0.1, 0.7]));
        assert_eq!(doc.similarity(&doc.clone()).unwrap(), 1.0);
    }

    #[test]
    fn test_cosine_orthogonal_is_zero_not_error() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_negative_clamped() {
        let sim = cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_cosine_dimension_mismatch() {
        let err = cosine_similarity(&[1.0], &[1.0, 2.0]).unwrap_err();
        assert_eq!(err, SimilarityUnavailable::DimensionMismatch { left: 1, right: 2 });
    }

    #[test]
    fn test_cosine_zero_vector() {
        let err = cosine_similarity(&[1.0, 1.0], &[0.0, 0.0]).unwrap_err();
        assert_eq!(err, SimilarityUnavailable::ZeroMagnitude { side: Side::Second });
    }

    #[test]
    fn test_missing_vector_reports_side() {
        let with = doc_with_vector(Some(vec![1.0]));
        let without = doc_with_vector(None);
        assert_eq!(
            with.similarity(&without).unwrap_err(),
            SimilarityUnavailable::MissingVector { side: Side::Second }
        );
        assert_eq!(
            without.similarity(&with).unwrap_err(),
            SimilarityUnavailable::MissingVector { side: Side::First }
        );
    }

    #[test]
    fn test_empty_vector_counts_as_missing() {
        let empty = doc_with_vector(Some(Vec::new()));
        assert!(matches!(
            empty.similarity(&empty),
            Err(SimilarityUnavailable::MissingVector { side: Side::First })
        ));
    }

    #[test]
    fn test_with_vector_keeps_annotations() {
        let doc = AnnotatedDocument::new(
            vec![Token::new("Apple", PartOfSpeech::Propn, false, false)],
            vec![EntitySpan::new("Apple", EntityLabel::Name)],
            None,
        );
        let doc = doc.with_vector(Some(vec![0.5]));
        assert_eq!(doc.tokens().len(), 1);
        assert_eq!(doc.entities().len(), 1);
        assert_eq!(doc.vector(), Some(&[0.5][..]));
    }

    #[test]
    fn test_pos_display_matches_ud_tags() {
        assert_eq!(PartOfSpeech::Propn.to_string(), "PROPN");
        assert_eq!(PartOfSpeech::Adj.to_string(), "ADJ");
        assert!(PartOfSpeech::Noun.is_content());
        assert!(!PartOfSpeech::Verb.is_content());
    }
}
