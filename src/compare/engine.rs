// Comparison engine — similarity plus entity and keyword set relationships.
//
// For each feature type the two documents' sets are split into three
// disjoint parts: shared, only in the first, only in the second. Keyword
// sets are cut to the top N per document BEFORE the split, so a keyword
// ranked just outside one document's top N never counts as shared.

use std::collections::HashSet;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use super::entities::EntityExtractor;
use super::keywords::KeywordExtractor;
use crate::document::{AnnotatedDocument, SimilarityUnavailable};
use crate::model::traits::LanguageModel;

/// Two sets split into intersection and both differences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub common: HashSet<String>,
    pub only_first: HashSet<String>,
    pub only_second: HashSet<String>,
}

impl Partition {
    pub fn of(first: &HashSet<String>, second: &HashSet<String>) -> Self {
        Self {
            common: first.intersection(second).cloned().collect(),
            only_first: first.difference(second).cloned().collect(),
            only_second: second.difference(first).cloned().collect(),
        }
    }

    /// Everything in the partition — equal to the union of the two inputs.
    pub fn union(&self) -> HashSet<String> {
        self.common
            .iter()
            .chain(&self.only_first)
            .chain(&self.only_second)
            .cloned()
            .collect()
    }
}

/// Entity and keyword partitions for a document pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FeatureComparison {
    pub entities: Partition,
    pub keywords: Partition,
}

/// The full comparison of two documents.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Semantic similarity, 0.0 to 1.0
    pub similarity: f64,
    pub entities: Partition,
    pub keywords: Partition,
}

impl ComparisonResult {
    pub fn new(similarity: f64, features: FeatureComparison) -> Self {
        Self {
            similarity,
            entities: features.entities,
            keywords: features.keywords,
        }
    }

    pub fn features(&self) -> FeatureComparison {
        FeatureComparison {
            entities: self.entities.clone(),
            keywords: self.keywords.clone(),
        }
    }
}

/// Compares annotated documents using an injected language model.
pub struct ComparisonEngine<'m> {
    model: &'m dyn LanguageModel,
    keywords: KeywordExtractor,
    entities: EntityExtractor,
}

impl<'m> ComparisonEngine<'m> {
    pub fn new(model: &'m dyn LanguageModel) -> Self {
        Self {
            model,
            keywords: KeywordExtractor::default(),
            entities: EntityExtractor,
        }
    }

    /// Keep the `top_n` most frequent keywords per document. Panics on zero.
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.keywords = KeywordExtractor::new(top_n);
        self
    }

    pub fn top_n(&self) -> usize {
        self.keywords.top_n()
    }

    /// Compare two annotated documents.
    ///
    /// Fails only when the model cannot produce a similarity score; a score
    /// of exactly 0.0 is a success.
    pub fn compare(
        &self,
        doc1: &AnnotatedDocument,
        doc2: &AnnotatedDocument,
    ) -> Result<ComparisonResult, SimilarityUnavailable> {
        let similarity = self.model.similarity(doc1, doc2)?;
        let result = ComparisonResult::new(similarity, self.compare_features(doc1, doc2));

        debug!(
            model = self.model.name(),
            similarity,
            common_entities = result.entities.common.len(),
            common_keywords = result.keywords.common.len(),
            "Compared documents"
        );

        Ok(result)
    }

    /// Entity and keyword partitions alone. Never fails.
    pub fn compare_features(
        &self,
        doc1: &AnnotatedDocument,
        doc2: &AnnotatedDocument,
    ) -> FeatureComparison {
        let ents1 = self.entities.extract(doc1);
        let ents2 = self.entities.extract(doc2);

        let kw1 = self.keyword_set(doc1);
        let kw2 = self.keyword_set(doc2);

        FeatureComparison {
            entities: Partition::of(&ents1, &ents2),
            keywords: Partition::of(&kw1, &kw2),
        }
    }

    /// Annotate two raw texts with the engine's model, then compare them.
    ///
    /// A missing similarity surfaces as a `SimilarityUnavailable` inside the
    /// returned error; use `anyhow::Error::downcast_ref` to tell it apart
    /// from annotation failures.
    pub fn compare_texts(&self, text1: &str, text2: &str) -> Result<ComparisonResult> {
        let doc1 = self
            .model
            .annotate(text1)
            .context("Failed to annotate the first document")?;
        let doc2 = self
            .model
            .annotate(text2)
            .context("Failed to annotate the second document")?;

        Ok(self.compare(&doc1, &doc2)?)
    }

    fn keyword_set(&self, doc: &AnnotatedDocument) -> HashSet<String> {
        self.keywords
            .extract(doc)
            .into_iter()
            .map(|k| k.keyword)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_partition_of() {
        let p = Partition::of(&set(&["a", "b", "c"]), &set(&["b", "c", "d"]));
        assert_eq!(p.common, set(&["b", "c"]));
        assert_eq!(p.only_first, set(&["a"]));
        assert_eq!(p.only_second, set(&["d"]));
        assert_eq!(p.union(), set(&["a", "b", "c", "d"]));
    }

    #[test]
    fn test_partition_disjoint_inputs() {
        let p = Partition::of(&set(&["x"]), &set(&["y"]));
        assert!(p.common.is_empty());
        assert_eq!(p.only_first, set(&["x"]));
        assert_eq!(p.only_second, set(&["y"]));
    }

    #[test]
    fn test_partition_empty() {
        let p = Partition::of(&HashSet::new(), &HashSet::new());
        assert!(p.union().is_empty());
    }
}
