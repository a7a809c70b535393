//! Card extraction from a tag paragraph and its following paragraphs.
//!
//! # Responsibility
//! - Assemble tagline, citation and body paragraphs for one card.
//! - Report structural rejections without consuming input.
//!
//! # Invariants
//! - A produced card always has a non-empty citation.
//! - On rejection the returned cursor is exactly `cursor + 1`.
//! - On success the returned cursor points at the first unconsumed
//!   (structural) paragraph, or one past the end.

use crate::model::outline::CardNode;
use crate::model::paragraph::Paragraph;
use crate::segment::style::{classify, is_structural, ParagraphKind, StyleConfig};
use std::fmt::{Display, Formatter};

/// Reason a tag paragraph did not produce a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardRejection {
    /// Tag is the last paragraph of the document.
    EndOfInput,
    /// Tag is immediately followed by another tag.
    TagAfterTag,
    /// Paragraph after the tag carries no citation-styled run.
    MissingCitation,
}

impl CardRejection {
    /// Stable lowercase code used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndOfInput => "end_of_input",
            Self::TagAfterTag => "tag_after_tag",
            Self::MissingCitation => "missing_citation",
        }
    }
}

impl Display for CardRejection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one extraction attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardExtraction {
    Card { card: CardNode, next: usize },
    Rejected { reason: CardRejection, next: usize },
}

/// Attempts to build a card from the tag paragraph at `cursor`.
///
/// The caller guarantees `paragraphs[cursor]` is the tag paragraph.
pub fn extract_card(styles: &StyleConfig, paragraphs: &[Paragraph], cursor: usize) -> CardExtraction {
    let rejected = |reason| CardExtraction::Rejected {
        reason,
        next: cursor + 1,
    };

    let Some(tag_paragraph) = paragraphs.get(cursor) else {
        return rejected(CardRejection::EndOfInput);
    };
    let Some(cite_paragraph) = paragraphs.get(cursor + 1) else {
        return rejected(CardRejection::EndOfInput);
    };
    if classify(styles, cite_paragraph) == Some(ParagraphKind::Tag) {
        return rejected(CardRejection::TagAfterTag);
    }

    let citation: String = cite_paragraph
        .runs
        .iter()
        .filter(|run| styles.is_cite_run(run))
        .map(|run| run.text.as_str())
        .collect();
    if citation.is_empty() {
        return rejected(CardRejection::MissingCitation);
    }

    let mut body = vec![tag_paragraph.clone(), cite_paragraph.clone()];
    let mut next = cursor + 2;
    while let Some(paragraph) = paragraphs.get(next) {
        if is_structural(styles, paragraph) {
            break;
        }
        body.push(paragraph.clone());
        next += 1;
    }

    CardExtraction::Card {
        card: CardNode {
            tagline: tag_paragraph.text(),
            citation,
            body,
        },
        next,
    }
}
