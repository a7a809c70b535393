//! Domain model for outline ingestion.
//!
//! # Responsibility
//! - Define the paragraph input shape supplied by document readers.
//! - Define the outline tree produced by segmentation and consumed by
//!   persistence.
//!
//! # Invariants
//! - Document order is preserved at every level of the outline.
//! - Persistence ids are assigned exactly once, parent before child.

pub mod document;
pub mod outline;
pub mod paragraph;
