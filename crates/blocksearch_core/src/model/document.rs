//! Source document model.

use crate::model::paragraph::Paragraph;

/// One input document as handed over by a `DocumentReader`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    /// File name without directories; stored in `Documents.FileName`.
    pub file_name: String,
    /// Full path as discovered; stored in `Documents.FilePath`.
    pub file_path: String,
    /// Last write time as Unix epoch milliseconds.
    pub last_modified_ms: i64,
    /// Ordered paragraph stream.
    pub paragraphs: Vec<Paragraph>,
}

impl SourceDocument {
    /// Creates an in-memory document, mostly useful for tests and adapters.
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        last_modified_ms: i64,
        paragraphs: Vec<Paragraph>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            last_modified_ms,
            paragraphs,
        }
    }
}
