//! Input collaborators: document readers and directory discovery.
//!
//! # Responsibility
//! - Supply ordered paragraph streams per document.
//! - Enumerate input files for a batch run.

pub mod discover;
pub mod reader;

pub use discover::discover_documents;
pub use reader::{DocumentReader, JsonDocumentReader, ReadError};
