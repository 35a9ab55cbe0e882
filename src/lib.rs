// docdiff: compare two documents by similarity, entities, and keywords.
//
// This is the library root. Each module corresponds to one stage of the
// comparison: ingest text, annotate it with a language model, compare the
// annotated documents, and render the result.

pub mod compare;
pub mod config;
pub mod document;
pub mod ingest;
pub mod model;
pub mod output;
