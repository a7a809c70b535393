//! Core ingestion logic for BlockSearch.
//! Rebuilds Pocket/Hat/Block/Card outlines from styled paragraph streams and
//! stores them in a denormalized SQLite schema.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod segment;
pub mod service;
pub mod source;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::document::SourceDocument;
pub use model::outline::{
    CardNode, HeaderLevel, HeaderNode, NodeId, NodeKind, OutlineError, OutlineNode, OutlineTree,
};
pub use model::paragraph::{Paragraph, Run};
pub use repo::outline_repo::{
    AncestorKeys, CardQuery, CardRecord, DocumentRecord, OutlineRepoError, OutlineRepoResult,
    OutlineRepository, SqliteOutlineRepository, StoredDocument,
};
pub use segment::card::{extract_card, CardExtraction, CardRejection};
pub use segment::segmenter::{segment, RejectedTag, Segmentation};
pub use segment::style::{classify, is_structural, ParagraphKind, StyleConfig, StyleConfigError};
pub use service::ingest_service::{
    BatchReport, IngestError, IngestReport, IngestService, SkippedDocument,
};
pub use service::outline_persist::{persist_outline, PersistError, PersistReport};
pub use source::{discover_documents, DocumentReader, JsonDocumentReader, ReadError};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
