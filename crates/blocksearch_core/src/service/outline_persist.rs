//! Depth-first writer from an outline tree to relational rows.
//!
//! # Responsibility
//! - Insert one row per outline node in pre-order.
//! - Attach a foreign key for every header ancestor actually present.
//! - Record each node's generated id before any descendant is written.
//!
//! # Invariants
//! - Writes are strictly sequential: a child's keys depend on its parent's id.
//! - A node's ancestors are always written before the node itself.

use crate::model::outline::{HeaderLevel, NodeId, NodeKind, OutlineError, OutlineTree};
use crate::repo::outline_repo::{AncestorKeys, OutlineRepoError, OutlineRepository};
use log::{debug, trace};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors raised while writing an outline.
#[derive(Debug)]
pub enum PersistError {
    /// Storage failure.
    Repo(OutlineRepoError),
    /// Tree bookkeeping failure.
    Outline(OutlineError),
    /// A node was reached before one of its ancestors had an id.
    UnassignedAncestor { node: NodeId, ancestor: NodeId },
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Repo(err) => write!(f, "{err}"),
            Self::Outline(err) => write!(f, "{err}"),
            Self::UnassignedAncestor { node, ancestor } => write!(
                f,
                "outline node #{} written before ancestor #{}",
                node.index(),
                ancestor.index()
            ),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::Outline(err) => Some(err),
            Self::UnassignedAncestor { .. } => None,
        }
    }
}

impl From<OutlineRepoError> for PersistError {
    fn from(value: OutlineRepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<OutlineError> for PersistError {
    fn from(value: OutlineError) -> Self {
        Self::Outline(value)
    }
}

/// Row counts written for one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PersistReport {
    pub pockets: usize,
    pub hats: usize,
    pub blocks: usize,
    pub cards: usize,
    pub paragraphs: usize,
}

/// Writes every node of `tree` under `document_id`.
///
/// # Side effects
/// - One insert per node and per card body paragraph, issued immediately.
/// - Sets `assigned_id` on every node of `tree`.
pub fn persist_outline<R: OutlineRepository + ?Sized>(
    repo: &R,
    tree: &mut OutlineTree,
    document_id: i64,
) -> Result<PersistReport, PersistError> {
    let mut report = PersistReport::default();

    for id in tree.pre_order() {
        let ancestors = ancestor_keys(tree, id)?;
        let Some(node) = tree.node(id) else {
            return Err(OutlineError::UnknownNode(id).into());
        };

        let row_id = match &node.kind {
            NodeKind::Header(header) => {
                let row_id =
                    repo.insert_header(header.level, document_id, &header.text, &ancestors)?;
                trace!(
                    "event=header_insert module=persist status=ok document_id={} level={} row_id={}",
                    document_id,
                    header.level.as_str(),
                    row_id
                );
                match header.level {
                    HeaderLevel::Pocket => report.pockets += 1,
                    HeaderLevel::Hat => report.hats += 1,
                    HeaderLevel::Block => report.blocks += 1,
                }
                row_id
            }
            NodeKind::Card(card) => {
                let card_id =
                    repo.insert_card(document_id, &card.tagline, &card.citation, &ancestors)?;
                for paragraph in &card.body {
                    repo.insert_paragraph(document_id, card_id, paragraph)?;
                }
                report.cards += 1;
                report.paragraphs += card.body.len();
                card_id
            }
        };
        tree.assign_id(id, row_id)?;
    }

    debug!(
        "event=outline_persist module=persist status=ok document_id={} pockets={} hats={} blocks={} cards={} paragraphs={}",
        document_id, report.pockets, report.hats, report.blocks, report.cards, report.paragraphs
    );
    Ok(report)
}

/// Collects the foreign keys of every header above `id`.
pub fn ancestor_keys(tree: &OutlineTree, id: NodeId) -> Result<AncestorKeys, PersistError> {
    let mut keys = AncestorKeys::default();
    for (ancestor_id, ancestor) in tree.ancestors(id) {
        let Some(header) = ancestor.as_header() else {
            continue;
        };
        let row_id = ancestor
            .assigned_id()
            .ok_or(PersistError::UnassignedAncestor {
                node: id,
                ancestor: ancestor_id,
            })?;
        keys.record(header.level, row_id);
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::{ancestor_keys, persist_outline, PersistError};
    use crate::model::outline::{CardNode, HeaderLevel, HeaderNode, NodeKind, OutlineTree};
    use crate::model::paragraph::Paragraph;
    use crate::repo::outline_repo::{
        AncestorKeys, CardQuery, CardRecord, DocumentRecord, OutlineRepoResult, OutlineRepository,
        StoredDocument,
    };
    use std::cell::RefCell;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Write {
        Header(HeaderLevel, String, AncestorKeys),
        Card(String, AncestorKeys),
        Paragraph(i64, String),
    }

    #[derive(Default)]
    struct RecordingRepo {
        writes: RefCell<Vec<Write>>,
    }

    impl RecordingRepo {
        fn push(&self, write: Write) -> OutlineRepoResult<i64> {
            let mut writes = self.writes.borrow_mut();
            writes.push(write);
            Ok(100 + writes.len() as i64)
        }
    }

    impl OutlineRepository for RecordingRepo {
        fn insert_document(&self, _document: &DocumentRecord) -> OutlineRepoResult<i64> {
            Ok(1)
        }

        fn find_document_by_path(
            &self,
            _file_path: &str,
        ) -> OutlineRepoResult<Option<StoredDocument>> {
            Ok(None)
        }

        fn insert_header(
            &self,
            level: HeaderLevel,
            _document_id: i64,
            text: &str,
            ancestors: &AncestorKeys,
        ) -> OutlineRepoResult<i64> {
            self.push(Write::Header(level, text.to_string(), *ancestors))
        }

        fn insert_card(
            &self,
            _document_id: i64,
            tagline: &str,
            _citation: &str,
            ancestors: &AncestorKeys,
        ) -> OutlineRepoResult<i64> {
            self.push(Write::Card(tagline.to_string(), *ancestors))
        }

        fn insert_paragraph(
            &self,
            _document_id: i64,
            card_id: i64,
            paragraph: &Paragraph,
        ) -> OutlineRepoResult<i64> {
            self.push(Write::Paragraph(card_id, paragraph.text()))
        }

        fn list_cards(&self, _query: &CardQuery) -> OutlineRepoResult<Vec<CardRecord>> {
            Ok(Vec::new())
        }

        fn list_card_paragraphs(&self, _card_id: i64) -> OutlineRepoResult<Vec<Paragraph>> {
            Ok(Vec::new())
        }

        fn delete_document(&self, _document_id: i64) -> OutlineRepoResult<()> {
            Ok(())
        }
    }

    fn header(level: HeaderLevel, text: &str) -> NodeKind {
        NodeKind::Header(HeaderNode {
            level,
            text: text.to_string(),
        })
    }

    fn card(tagline: &str, body: &[&str]) -> NodeKind {
        NodeKind::Card(CardNode {
            tagline: tagline.to_string(),
            citation: "Author".to_string(),
            body: body.iter().map(|text| Paragraph::body(*text)).collect(),
        })
    }

    #[test]
    fn writes_in_pre_order_with_parent_ids() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        let h1 = tree.push_child(p1, header(HeaderLevel::Hat, "H1")).unwrap();
        let b1 = tree.push_child(h1, header(HeaderLevel::Block, "B1")).unwrap();
        let c1 = tree.push_child(b1, card("Claim", &["tag", "cite", "text"])).unwrap();

        let repo = RecordingRepo::default();
        let report = persist_outline(&repo, &mut tree, 1).unwrap();

        let writes = repo.writes.borrow();
        assert_eq!(
            writes[0],
            Write::Header(HeaderLevel::Pocket, "P1".to_string(), AncestorKeys::default())
        );
        assert_eq!(
            writes[1],
            Write::Header(
                HeaderLevel::Hat,
                "H1".to_string(),
                AncestorKeys {
                    pocket_id: Some(101),
                    ..AncestorKeys::default()
                }
            )
        );
        assert_eq!(
            writes[3],
            Write::Card(
                "Claim".to_string(),
                AncestorKeys {
                    pocket_id: Some(101),
                    hat_id: Some(102),
                    block_id: Some(103),
                }
            )
        );
        assert_eq!(writes[4], Write::Paragraph(104, "tag".to_string()));
        assert_eq!(writes[6], Write::Paragraph(104, "text".to_string()));

        assert_eq!(tree.node(c1).unwrap().assigned_id(), Some(104));
        assert_eq!(report.cards, 1);
        assert_eq!(report.paragraphs, 3);
        assert_eq!((report.pockets, report.hats, report.blocks), (1, 1, 1));
    }

    #[test]
    fn card_keys_match_reachable_ancestors() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        tree.push_child(p1, card("Orphan", &[])).unwrap();
        let h2 = tree.push_root(header(HeaderLevel::Hat, "H2"));
        tree.push_child(h2, card("Under hat", &[])).unwrap();
        tree.push_root(card("Top", &[]));

        let repo = RecordingRepo::default();
        persist_outline(&repo, &mut tree, 1).unwrap();

        let cards: Vec<_> = repo
            .writes
            .borrow()
            .iter()
            .filter_map(|write| match write {
                Write::Card(tagline, keys) => Some((tagline.clone(), *keys)),
                _ => None,
            })
            .collect();
        assert_eq!(cards[0].1.pocket_id, Some(101));
        assert_eq!((cards[0].1.hat_id, cards[0].1.block_id), (None, None));
        assert_eq!(cards[1].1.pocket_id, None);
        assert_eq!(cards[1].1.hat_id, Some(103));
        assert_eq!(cards[2].1, AncestorKeys::default());
    }

    #[test]
    fn ancestor_keys_require_written_ancestors() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        let c1 = tree.push_child(p1, card("Claim", &[])).unwrap();

        let err = ancestor_keys(&tree, c1).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnassignedAncestor { node, ancestor } if node == c1 && ancestor == p1
        ));
    }
}
