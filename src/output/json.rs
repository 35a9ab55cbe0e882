// JSON report — the complete comparison with sets as sorted arrays.

use anyhow::Result;
use serde::Serialize;

use super::sorted;
use crate::compare::{FeatureComparison, Partition};
use crate::document::SimilarityUnavailable;

#[derive(Debug, Serialize)]
pub struct PartitionReport<'a> {
    pub common: Vec<&'a str>,
    pub unique_to_first: Vec<&'a str>,
    pub unique_to_second: Vec<&'a str>,
}

impl<'a> From<&'a Partition> for PartitionReport<'a> {
    fn from(p: &'a Partition) -> Self {
        Self {
            common: sorted(&p.common),
            unique_to_first: sorted(&p.only_first),
            unique_to_second: sorted(&p.only_second),
        }
    }
}

/// Serializable comparison. `similarity` is null when it couldn't be
/// computed, with the reason in `similarity_error`.
#[derive(Debug, Serialize)]
pub struct ComparisonReport<'a> {
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_error: Option<String>,
    pub entities: PartitionReport<'a>,
    pub keywords: PartitionReport<'a>,
}

impl<'a> ComparisonReport<'a> {
    pub fn new(
        similarity: Result<f64, &SimilarityUnavailable>,
        features: &'a FeatureComparison,
    ) -> Self {
        let (similarity, similarity_error) = match similarity {
            Ok(score) => (Some(score), None),
            Err(e) => (None, Some(e.to_string())),
        };
        Self {
            similarity,
            similarity_error,
            entities: PartitionReport::from(&features.entities),
            keywords: PartitionReport::from(&features.keywords),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
