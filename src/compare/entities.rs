// Entity extraction — the set of entity surface strings in a document.

use std::collections::HashSet;

use crate::document::AnnotatedDocument;

/// Projects a document's entity spans to a set of surface strings.
///
/// Duplicates collapse; casing and whitespace are kept as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityExtractor;

impl EntityExtractor {
    pub fn extract(&self, doc: &AnnotatedDocument) -> HashSet<String> {
        doc.entities().iter().map(|e| e.text.clone()).collect()
    }
}
