// Language models — trait-based abstraction for swappable annotators.
//
// The LanguageModel trait defines the interface. LexicalModel is the
// rule-based default; EmbeddingModel keeps the lexical annotations but
// measures similarity in a sentence-transformer vector space.

pub mod download;
pub mod embedding;
pub mod lexical;
pub mod traits;

pub use embedding::EmbeddingModel;
pub use lexical::LexicalModel;
pub use traits::LanguageModel;
