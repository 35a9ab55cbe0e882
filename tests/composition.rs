// Composition tests — verifying that the stages chain together correctly.
//
// These tests exercise the data flow between modules:
//   Ingest -> Lexical model -> Comparison engine -> JSON report
// without network calls or model downloads (files are written to the
// system temp directory and removed afterwards).

use std::collections::HashSet;

use docdiff::compare::ComparisonEngine;
use docdiff::document::{Side, SimilarityUnavailable};
use docdiff::ingest::extract_path;
use docdiff::model::{LanguageModel, LexicalModel};
use docdiff::output::json::ComparisonReport;

const ASTRONOMY_A: &str = "Astronomers at NASA pointed the Hubble telescope at a distant galaxy. \
                           The galaxy glowed behind a nebula.";
const ASTRONOMY_B: &str = "The Hubble telescope captured a nebula. Astronomers at NASA studied the galaxy.";
const BOTANY: &str = "Chlorophyll drives photosynthesis inside leaves. In 1859 Darwin described orchids.";

fn set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// Chain: Lexical model -> Engine
// ============================================================

#[test]
fn related_texts_share_entities_and_keywords() {
    let model = LexicalModel::new().unwrap();
    let engine = ComparisonEngine::new(&model);

    let result = engine.compare_texts(ASTRONOMY_A, ASTRONOMY_B).unwrap();

    assert!(
        result.entities.common.contains("NASA"),
        "common entities: {:?}",
        result.entities.common
    );

    assert!(
        result
            .keywords
            .common
            .is_superset(&set(&["Hubble", "telescope", "nebula", "galaxy"])),
        "common keywords: {:?}",
        result.keywords.common
    );
    assert!(result.keywords.only_first.contains("distant"));
}

#[test]
fn related_texts_score_higher_than_unrelated() {
    let model = LexicalModel::new().unwrap();
    let engine = ComparisonEngine::new(&model);

    let related = engine.compare_texts(ASTRONOMY_A, ASTRONOMY_B).unwrap();
    let unrelated = engine.compare_texts(ASTRONOMY_A, BOTANY).unwrap();

    assert!(
        related.similarity > unrelated.similarity,
        "related {} should beat unrelated {}",
        related.similarity,
        unrelated.similarity
    );
    assert!((0.0..=1.0).contains(&related.similarity));
    assert!((0.0..=1.0).contains(&unrelated.similarity));
}

#[test]
fn unrelated_texts_share_no_entities() {
    let model = LexicalModel::new().unwrap();
    let result = ComparisonEngine::new(&model)
        .compare_texts(ASTRONOMY_A, BOTANY)
        .unwrap();

    assert!(result.entities.common.is_empty());
    assert!(result.entities.only_second.contains("Darwin"));
    assert!(result.entities.only_second.contains("1859"));
}

#[test]
fn text_compared_with_itself() {
    let model = LexicalModel::new().unwrap();
    let result = ComparisonEngine::new(&model)
        .compare_texts(ASTRONOMY_A, ASTRONOMY_A)
        .unwrap();

    assert_eq!(result.similarity, 1.0);
    assert!(result.entities.only_first.is_empty());
    assert!(result.entities.only_second.is_empty());
    assert!(result.keywords.only_first.is_empty());
    assert!(result.keywords.only_second.is_empty());
}

#[test]
fn empty_text_makes_similarity_unavailable() {
    let model = LexicalModel::new().unwrap();
    let engine = ComparisonEngine::new(&model);

    let err = engine.compare_texts("", ASTRONOMY_B).unwrap_err();
    assert_eq!(
        err.downcast_ref::<SimilarityUnavailable>(),
        Some(&SimilarityUnavailable::MissingVector { side: Side::First })
    );

    // The feature comparison still works on the same documents
    let empty = model.annotate("").unwrap();
    let other = model.annotate(ASTRONOMY_B).unwrap();
    let features = engine.compare_features(&empty, &other);
    assert!(features.entities.common.is_empty());
    assert!(features.entities.only_first.is_empty());
    assert!(features.entities.only_second.contains("NASA"));
}

// ============================================================
// Chain: Ingest -> Model -> Engine -> Report
// ============================================================

#[test]
fn files_to_json_report() {
    let dir = std::env::temp_dir().join("docdiff-composition-test");
    std::fs::create_dir_all(&dir).unwrap();
    let path_a = dir.join("a.txt");
    let path_b = dir.join("b.txt");
    std::fs::write(&path_a, ASTRONOMY_A).unwrap();
    std::fs::write(&path_b, ASTRONOMY_B).unwrap();

    let model = LexicalModel::new().unwrap();
    let doc_a = model.annotate(&extract_path(&path_a).unwrap().text()).unwrap();
    let doc_b = model.annotate(&extract_path(&path_b).unwrap().text()).unwrap();

    let result = ComparisonEngine::new(&model).compare(&doc_a, &doc_b).unwrap();
    let features = result.features();
    let json = ComparisonReport::new(Ok(result.similarity), &features)
        .to_json()
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    let common = value["entities"]["common"].as_array().unwrap();
    assert!(common.contains(&serde_json::json!("NASA")), "{common:?}");
    assert!(value["similarity"].as_f64().unwrap() > 0.0);

    std::fs::remove_dir_all(&dir).unwrap();
}
