//! Single-pass segmentation of a paragraph stream into an outline tree.
//!
//! # Responsibility
//! - Drive one forward cursor over the paragraphs of a document.
//! - Keep the open header chain and attach headers/cards at the right depth.
//!
//! # Invariants
//! - Every paragraph is visited at most once; the cursor only moves forward.
//! - A header's parent, when present, has a strictly shallower level.
//! - Cards attach to the innermost open header, or the top level.

use crate::model::outline::{HeaderLevel, HeaderNode, NodeId, NodeKind, OutlineError, OutlineTree};
use crate::model::paragraph::Paragraph;
use crate::segment::card::{extract_card, CardExtraction, CardRejection};
use crate::segment::style::{classify, StyleConfig};
use log::debug;

/// Tag paragraph that did not produce a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RejectedTag {
    /// Index of the tag paragraph in the input.
    pub index: usize,
    pub reason: CardRejection,
}

/// Segmentation output for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Segmentation {
    pub tree: OutlineTree,
    pub rejected: Vec<RejectedTag>,
}

/// Open headers from the outermost to the innermost.
#[derive(Debug, Default)]
struct HeaderChain {
    entries: Vec<(HeaderLevel, NodeId)>,
}

impl HeaderChain {
    fn current(&self) -> Option<NodeId> {
        self.entries.last().map(|(_, id)| *id)
    }

    /// Closes every open header at `level` or deeper and returns the new
    /// parent for a header of `level`.
    fn parent_for(&mut self, level: HeaderLevel) -> Option<NodeId> {
        while matches!(self.entries.last(), Some((open, _)) if *open >= level) {
            self.entries.pop();
        }
        self.current()
    }

    fn open(&mut self, level: HeaderLevel, id: NodeId) {
        self.entries.push((level, id));
    }
}

/// Builds the outline tree for `paragraphs`.
pub fn segment(styles: &StyleConfig, paragraphs: &[Paragraph]) -> Result<Segmentation, OutlineError> {
    let mut output = Segmentation::default();
    let mut chain = HeaderChain::default();
    let mut cursor = 0;

    while let Some(paragraph) = paragraphs.get(cursor) {
        let Some(kind) = classify(styles, paragraph) else {
            cursor += 1;
            continue;
        };
        cursor = match kind.header_level() {
            Some(level) => {
                let parent = chain.parent_for(level);
                let header = NodeKind::Header(HeaderNode {
                    level,
                    text: paragraph.first_run_text().to_string(),
                });
                let id = output.tree.attach(parent, header)?;
                chain.open(level, id);
                cursor + 1
            }
            None => match extract_card(styles, paragraphs, cursor) {
                CardExtraction::Card { card, next } => {
                    output.tree.attach(chain.current(), NodeKind::Card(card))?;
                    next
                }
                CardExtraction::Rejected { reason, next } => {
                    debug!(
                        "event=card_rejected module=segment status=skip index={} reason={}",
                        cursor, reason
                    );
                    output.rejected.push(RejectedTag {
                        index: cursor,
                        reason,
                    });
                    next
                }
            },
        };
    }

    Ok(output)
}
