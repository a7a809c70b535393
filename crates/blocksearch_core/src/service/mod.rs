//! Service layer for ingestion use-cases.
//!
//! # Responsibility
//! - Orchestrate segmentation and persistence per document.
//! - Own the per-document transaction and the batch failure boundary.

pub mod ingest_service;
pub mod outline_persist;
