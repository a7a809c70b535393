//! Paragraph-stream segmentation.
//!
//! # Responsibility
//! - Classify paragraphs by style into outline levels.
//! - Assemble cards from tag/citation/body paragraph runs.
//! - Rebuild the implicit outline tree in one forward pass.
//!
//! # Invariants
//! - Segmentation is pure: no I/O, no shared mutable cursor.
//! - Malformed tags are dropped and reported, never retried.

pub mod card;
pub mod segmenter;
pub mod style;
