// Document comparison — keyword and entity extraction plus the engine that
// combines them with the model's similarity score.

pub mod engine;
pub mod entities;
pub mod keywords;

pub use engine::{ComparisonEngine, ComparisonResult, FeatureComparison, Partition};
pub use entities::EntityExtractor;
pub use keywords::{KeywordCount, KeywordExtractor, DEFAULT_TOP_N};
