//! Content update handlers.
//!
//! Each handler compiles its path outside the lock, then evaluates it and
//! applies the change inside one [`Database::write_with`] call. Target
//! selection and mutation therefore see the same tree, and a failure part
//! way through discards the staged copy.
//!
//! [`Database::write_with`]: arbor_storage::Database::write_with

use std::sync::Arc;

use tracing::info;

use arbor_core::{NodeId, NodeKind};
use arbor_storage::{parse_fragment, Tree};

use crate::command::UpdateKind;
use crate::context::Context;
use crate::handlers::eval_nodes;
use crate::{Error, Executor, Result};

/// 1-based insert position; 0 and `None` append
fn position(pos: Option<usize>) -> Option<usize> {
    pos.filter(|p| *p > 0)
}

/// Handle `Insert`.
pub fn insert(
    executor: &Executor,
    ctx: &mut Context,
    kind: UpdateKind,
    target: &str,
    pos: Option<usize>,
    values: &[String],
) -> Result<String> {
    let db = ctx.require_database()?;
    let plan = executor.engine().compile(target)?;
    let fragment = match kind {
        UpdateKind::Fragment => Some(parse_fragment(&values[0], ctx.options().chop)?),
        _ => None,
    };
    let selection = ctx.selection();
    let interrupt = ctx.interrupt();
    let pos = position(pos);

    let (targets, added) = db.write_with(interrupt, |tree: &mut Tree| {
        let targets = eval_nodes(plan.as_ref(), Some(&*tree), &selection, interrupt)?;
        let before = tree.size();
        for &t in &targets {
            match kind {
                UpdateKind::Element => {
                    tree.insert_element(t, pos, &values[0])?;
                }
                UpdateKind::Text => {
                    tree.insert_text(t, pos, &values[0])?;
                }
                UpdateKind::Attribute => {
                    tree.insert_attribute(t, &values[0], &values[1])?;
                }
                UpdateKind::Comment => {
                    tree.insert_comment(t, pos, &values[0])?;
                }
                UpdateKind::Pi => {
                    tree.insert_pi(t, pos, &values[0], &values[1])?;
                }
                UpdateKind::Fragment => {
                    if let Some(fragment) = &fragment {
                        tree.graft(t, pos, fragment)?;
                    }
                }
            }
        }
        Ok::<_, Error>((targets.len(), tree.size() - before))
    })?;

    info!(target: "arbor::db", db = db.name(), kind = %kind, targets, added, "insert");
    Ok(format!(
        "{} inserted into {} node(s), {} node(s) added.",
        kind, targets, added
    ))
}

/// Handle `Update`: only targets whose kind matches `kind` change.
pub fn update(
    executor: &Executor,
    ctx: &mut Context,
    kind: UpdateKind,
    target: &str,
    values: &[String],
) -> Result<String> {
    let db = ctx.require_database()?;
    let plan = executor.engine().compile(target)?;
    let selection = ctx.selection();
    let interrupt = ctx.interrupt();

    let updated = db.write_with(interrupt, |tree: &mut Tree| {
        let targets = eval_nodes(plan.as_ref(), Some(&*tree), &selection, interrupt)?;
        let mut updated = 0usize;
        for t in targets {
            let Some(node_kind) = tree.kind(t) else {
                continue;
            };
            match (kind, node_kind) {
                (UpdateKind::Element, NodeKind::Element) => tree.rename(t, &values[0])?,
                (UpdateKind::Attribute, NodeKind::Attribute)
                | (UpdateKind::Pi, NodeKind::ProcessingInstruction) => {
                    tree.rename(t, &values[0])?;
                    tree.set_value(t, &values[1])?;
                }
                (UpdateKind::Text, NodeKind::Text) | (UpdateKind::Comment, NodeKind::Comment) => {
                    tree.set_value(t, &values[0])?
                }
                _ => continue,
            }
            updated += 1;
        }
        Ok::<_, Error>(updated)
    })?;

    info!(target: "arbor::db", db = db.name(), kind = %kind, updated, "update");
    Ok(format!("{} node(s) updated.", updated))
}

/// Handle `Delete`.
pub fn delete(executor: &Executor, ctx: &mut Context, target: &str) -> Result<String> {
    let db = Arc::clone(ctx.require_database()?);
    let plan = executor.engine().compile(target)?;
    let selection = ctx.selection();
    let interrupt = ctx.interrupt();

    let removed = db.write_with(interrupt, |tree: &mut Tree| {
        let targets = eval_nodes(plan.as_ref(), Some(&*tree), &selection, interrupt)?;
        let mut removed = 0usize;
        for t in targets {
            // already gone with an ancestor deleted earlier in this loop
            if !tree.contains(t) {
                continue;
            }
            removed += tree.remove(t)?;
        }
        Ok::<_, Error>(removed)
    })?;

    // the selection may now name deleted nodes
    let live: Vec<NodeId> = {
        let tree = db.read();
        selection.iter().copied().filter(|n| tree.contains(*n)).collect()
    };
    ctx.set_selection(live);

    info!(target: "arbor::db", db = db.name(), removed, "delete");
    Ok(format!("{} node(s) deleted.", removed))
}

/// Handle `Copy`: every source node is copied into every target.
pub fn copy(
    executor: &Executor,
    ctx: &mut Context,
    source: &str,
    target: &str,
    pos: Option<usize>,
) -> Result<String> {
    let db = ctx.require_database()?;
    let source_plan = executor.engine().compile(source)?;
    let target_plan = executor.engine().compile(target)?;
    let selection = ctx.selection();
    let interrupt = ctx.interrupt();
    let pos = position(pos);

    let added = db.write_with(interrupt, |tree: &mut Tree| {
        let sources = eval_nodes(source_plan.as_ref(), Some(&*tree), &selection, interrupt)?;
        let targets = eval_nodes(target_plan.as_ref(), Some(&*tree), &selection, interrupt)?;
        if let Some(bad) = targets
            .iter()
            .find(|t| !tree.kind(**t).is_some_and(NodeKind::is_container))
        {
            return Err(Error::validation(format!(
                "copy target {} is not an element or document node",
                bad
            )));
        }

        let fragments = sources
            .iter()
            .map(|s| tree.extract(*s))
            .collect::<arbor_core::Result<Vec<Tree>>>()?;

        let before = tree.size();
        for &t in &targets {
            let mut at = pos;
            for fragment in &fragments {
                tree.graft(t, at, fragment)?;
                at = at.map(|p| p + fragment.children(NodeId::ROOT).len());
            }
        }
        Ok(tree.size() - before)
    })?;

    info!(target: "arbor::db", db = db.name(), added, "copy");
    Ok(format!("{} node(s) copied.", added))
}
