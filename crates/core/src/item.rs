//! Query result items
//!
//! The command layer treats items as opaque apart from two questions: is this
//! a node (selection commands need node sequences) and how is it rendered to
//! the output sink.

use serde::{Deserialize, Serialize};

use crate::node::NodeId;

/// One item of a query result sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Item {
    /// Reference to a node of the evaluated database
    Node(NodeId),
    /// Integer atomic value
    Integer(i64),
    /// String atomic value
    String(String),
}

impl Item {
    /// Return the node id if this item is a node
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Item::Node(id) => Some(*id),
            _ => None,
        }
    }
}

impl From<NodeId> for Item {
    fn from(id: NodeId) -> Self {
        Item::Node(id)
    }
}
