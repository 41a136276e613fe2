//! Command handlers organized by category.
//!
//! | Module | Commands |
//! |--------|----------|
//! | `database` | CreateDb, Open, Close, DropDb, List, InfoDb |
//! | `query` | Cs, XQuery, Run |
//! | `update` | Insert, Update, Delete, Copy |
//! | `admin` | Info, Set, Kill |

pub mod admin;
pub mod database;
pub mod query;
pub mod update;

use arbor_core::{Interrupt, Item, NodeId};
use arbor_query::{EvalInput, Plan};
use arbor_storage::{serialize, Tree};

use crate::{Error, Result};

/// Evaluate `plan` and require every item to be a node.
pub(crate) fn eval_nodes(
    plan: &dyn Plan,
    tree: Option<&Tree>,
    context: &[NodeId],
    interrupt: &Interrupt,
) -> Result<Vec<NodeId>> {
    let input = EvalInput {
        tree,
        context,
        interrupt,
    };
    let mut nodes = Vec::new();
    for item in plan.evaluate(input)? {
        match item? {
            Item::Node(id) => nodes.push(id),
            other => {
                return Err(Error::Evaluation {
                    reason: format!("expected nodes, found {:?}", other),
                })
            }
        }
    }
    Ok(nodes)
}

/// Serialize one result item
pub(crate) fn render(tree: Option<&Tree>, item: &Item) -> String {
    match item {
        Item::Node(id) => tree.map(|t| serialize(t, *id)).unwrap_or_default(),
        Item::Integer(i) => i.to_string(),
        Item::String(s) => s.clone(),
    }
}
