//! Outline tree reconstructed from a flat paragraph stream.
//!
//! # Responsibility
//! - Hold Pocket/Hat/Block headers and Cards in document order.
//! - Track parent links and persistence ids for the relational writer.
//!
//! # Invariants
//! - Nodes live in an arena and are addressed by `NodeId`; a node's parent is
//!   always created before the node itself, so the tree is acyclic.
//! - `children` and `roots` preserve insertion (document) order.
//! - `assigned_id` is set at most once, after the node's row is written.

use crate::model::paragraph::Paragraph;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Arena index of one outline node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Raw arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Header level, ordered shallow to deep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HeaderLevel {
    /// Outer grouping.
    Pocket,
    /// Sub-grouping.
    Hat,
    /// Topical unit.
    Block,
}

impl HeaderLevel {
    /// Stable lowercase name used in log events.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pocket => "pocket",
            Self::Hat => "hat",
            Self::Block => "block",
        }
    }
}

/// Header payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderNode {
    pub level: HeaderLevel,
    /// First run of the heading paragraph.
    pub text: String,
}

/// Card payload: tagline, citation and owned body paragraphs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardNode {
    pub tagline: String,
    /// Never empty for cards produced by segmentation.
    pub citation: String,
    /// Tag paragraph, citation paragraph and trailing body, in document order.
    pub body: Vec<Paragraph>,
}

/// Node variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Header(HeaderNode),
    Card(CardNode),
}

/// One outline node with its structural links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineNode {
    pub kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    assigned_id: Option<i64>,
}

impl OutlineNode {
    /// Parent node, `None` for top-level nodes.
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Ordered child ids.
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Persisted row id, `None` until written.
    pub fn assigned_id(&self) -> Option<i64> {
        self.assigned_id
    }

    /// Header payload when this node is a header.
    pub fn as_header(&self) -> Option<&HeaderNode> {
        match &self.kind {
            NodeKind::Header(header) => Some(header),
            NodeKind::Card(_) => None,
        }
    }

    /// Card payload when this node is a card.
    pub fn as_card(&self) -> Option<&CardNode> {
        match &self.kind {
            NodeKind::Card(card) => Some(card),
            NodeKind::Header(_) => None,
        }
    }
}

/// Errors raised by tree mutation helpers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutlineError {
    /// Node id does not belong to this tree.
    UnknownNode(NodeId),
    /// Cards cannot own children.
    CardCannotHaveChildren(NodeId),
    /// Persistence id was already assigned.
    IdAlreadyAssigned { node: NodeId, existing: i64 },
}

impl Display for OutlineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownNode(id) => write!(f, "outline node not found: #{}", id.0),
            Self::CardCannotHaveChildren(id) => {
                write!(f, "outline node #{} is a card and cannot own children", id.0)
            }
            Self::IdAlreadyAssigned { node, existing } => write!(
                f,
                "outline node #{} already has persisted id {existing}",
                node.0
            ),
        }
    }
}

impl Error for OutlineError {}

/// Outline of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutlineTree {
    nodes: Vec<OutlineNode>,
    roots: Vec<NodeId>,
}

impl OutlineTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a node at the top level.
    pub fn push_root(&mut self, kind: NodeKind) -> NodeId {
        let id = self.alloc(kind, None);
        self.roots.push(id);
        id
    }

    /// Appends a node as the last child of `parent`.
    pub fn push_child(&mut self, parent: NodeId, kind: NodeKind) -> Result<NodeId, OutlineError> {
        match self.nodes.get(parent.0) {
            None => return Err(OutlineError::UnknownNode(parent)),
            Some(node) if node.as_card().is_some() => {
                return Err(OutlineError::CardCannotHaveChildren(parent));
            }
            Some(_) => {}
        }
        let id = self.alloc(kind, Some(parent));
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    /// Appends under `parent` when present, otherwise at the top level.
    pub fn attach(&mut self, parent: Option<NodeId>, kind: NodeKind) -> Result<NodeId, OutlineError> {
        match parent {
            Some(parent) => self.push_child(parent, kind),
            None => Ok(self.push_root(kind)),
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&OutlineNode> {
        self.nodes.get(id.0)
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ancestors of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.node(id).and_then(OutlineNode::parent),
        }
    }

    /// Depth-first pre-order walk over every node.
    pub fn pre_order(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        order
    }

    /// Records the persisted row id for `id`.
    pub fn assign_id(&mut self, id: NodeId, value: i64) -> Result<(), OutlineError> {
        let node = self
            .nodes
            .get_mut(id.0)
            .ok_or(OutlineError::UnknownNode(id))?;
        if let Some(existing) = node.assigned_id {
            return Err(OutlineError::IdAlreadyAssigned { node: id, existing });
        }
        node.assigned_id = Some(value);
        Ok(())
    }

    /// All card nodes in pre-order.
    pub fn cards(&self) -> impl Iterator<Item = (NodeId, &CardNode)> + '_ {
        self.pre_order()
            .into_iter()
            .filter_map(move |id| self.nodes[id.0].as_card().map(|card| (id, card)))
    }

    fn alloc(&mut self, kind: NodeKind, parent: Option<NodeId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(OutlineNode {
            kind,
            parent,
            children: Vec::new(),
            assigned_id: None,
        });
        id
    }
}

/// Iterator over a node's ancestors, nearest first.
pub struct Ancestors<'tree> {
    tree: &'tree OutlineTree,
    next: Option<NodeId>,
}

impl<'tree> Iterator for Ancestors<'tree> {
    type Item = (NodeId, &'tree OutlineNode);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        let node = self.tree.node(id)?;
        self.next = node.parent;
        Some((id, node))
    }
}

#[cfg(test)]
mod tests {
    use super::{CardNode, HeaderLevel, HeaderNode, NodeKind, OutlineError, OutlineTree};

    fn header(level: HeaderLevel, text: &str) -> NodeKind {
        NodeKind::Header(HeaderNode {
            level,
            text: text.to_string(),
        })
    }

    fn card(tagline: &str) -> NodeKind {
        NodeKind::Card(CardNode {
            tagline: tagline.to_string(),
            citation: "Author".to_string(),
            body: Vec::new(),
        })
    }

    #[test]
    fn pre_order_follows_document_order() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        let h1 = tree.push_child(p1, header(HeaderLevel::Hat, "H1")).unwrap();
        let c1 = tree.push_child(h1, card("C1")).unwrap();
        let h2 = tree.push_child(p1, header(HeaderLevel::Hat, "H2")).unwrap();
        let p2 = tree.push_root(header(HeaderLevel::Pocket, "P2"));

        assert_eq!(tree.pre_order(), vec![p1, h1, c1, h2, p2]);
        assert_eq!(tree.roots(), &[p1, p2]);
    }

    #[test]
    fn ancestors_walk_nearest_first() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        let h1 = tree.push_child(p1, header(HeaderLevel::Hat, "H1")).unwrap();
        let b1 = tree.push_child(h1, header(HeaderLevel::Block, "B1")).unwrap();
        let c1 = tree.push_child(b1, card("C1")).unwrap();

        let chain: Vec<_> = tree.ancestors(c1).map(|(id, _)| id).collect();
        assert_eq!(chain, vec![b1, h1, p1]);
        assert_eq!(tree.ancestors(p1).count(), 0);
    }

    #[test]
    fn cards_reject_children() {
        let mut tree = OutlineTree::new();
        let c1 = tree.push_root(card("C1"));
        let err = tree.push_child(c1, card("C2")).unwrap_err();
        assert_eq!(err, OutlineError::CardCannotHaveChildren(c1));
    }

    #[test]
    fn assign_id_only_once() {
        let mut tree = OutlineTree::new();
        let p1 = tree.push_root(header(HeaderLevel::Pocket, "P1"));
        tree.assign_id(p1, 7).unwrap();
        let err = tree.assign_id(p1, 8).unwrap_err();
        assert_eq!(
            err,
            OutlineError::IdAlreadyAssigned {
                node: p1,
                existing: 7
            }
        );
        assert_eq!(tree.node(p1).unwrap().assigned_id(), Some(7));
    }

    #[test]
    fn header_levels_order_shallow_to_deep() {
        assert!(HeaderLevel::Pocket < HeaderLevel::Hat);
        assert!(HeaderLevel::Hat < HeaderLevel::Block);
    }
}
