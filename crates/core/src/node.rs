//! Node identity and kinds
//!
//! A [`NodeId`] addresses a node inside one database tree. Ids are stable for
//! the life of a node: updates never renumber existing nodes, so a selection
//! taken before a mutation still names the same nodes afterwards (or nodes
//! that no longer exist, which readers must tolerate).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier of a node within one database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The document node of every tree
    pub const ROOT: NodeId = NodeId(0);

    /// Index into the owning tree's node arena
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The six XML node kinds stored by a database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Document node (one per database, always the root)
    Document,
    /// Element node
    Element,
    /// Text node
    Text,
    /// Attribute node
    Attribute,
    /// Comment node
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

impl NodeKind {
    /// Whether nodes of this kind may own children
    pub fn is_container(self) -> bool {
        matches!(self, NodeKind::Document | NodeKind::Element)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NodeKind::Document => "document",
            NodeKind::Element => "element",
            NodeKind::Text => "text",
            NodeKind::Attribute => "attribute",
            NodeKind::Comment => "comment",
            NodeKind::ProcessingInstruction => "processing-instruction",
        };
        f.write_str(s)
    }
}
