//! Selection and query handlers.
//!
//! Query evaluation holds the database read lock for the whole traversal:
//! the item iterator borrows the tree from the guard, so the guard cannot be
//! released before the last item is pulled, and it is dropped on every exit.

use std::time::{Duration, Instant};

use tracing::debug;

use arbor_query::EvalInput;

use crate::context::Context;
use crate::handlers::{eval_nodes, render};
use crate::output::Output;
use crate::{Error, Executor, Result};

/// Handle `Cs`: evaluate a path and make its nodes the selection.
pub fn cs(executor: &Executor, ctx: &mut Context, query: &str) -> Result<String> {
    let plan = executor.engine().compile(query)?;
    let selection = ctx.selection();
    let nodes = match ctx.database() {
        Some(db) => {
            let tree = db.read_interruptible(ctx.interrupt())?;
            eval_nodes(plan.as_ref(), Some(&*tree), &selection, ctx.interrupt())?
        }
        None => eval_nodes(plan.as_ref(), None, &selection, ctx.interrupt())?,
    };
    let count = nodes.len();
    ctx.set_selection(nodes);
    Ok(format!("{} node(s) selected.", count))
}

/// Handle `XQuery`.
pub fn xquery(
    executor: &Executor,
    ctx: &mut Context,
    query: &str,
    out: &mut Output<'_>,
) -> Result<String> {
    let started = Instant::now();
    let plan = executor.engine().compile(query)?;
    let stats = plan.stats();
    let options = *ctx.options();
    let selection = ctx.selection();
    let interrupt = ctx.interrupt();

    let guard = match ctx.database() {
        Some(db) if plan.needs_tree() => Some(db.read_interruptible(interrupt)?),
        _ => None,
    };
    let tree = guard.as_deref();

    let eval_started = Instant::now();
    let mut count = 0usize;
    for run in 1..=options.runs {
        let input = EvalInput {
            tree,
            context: &selection,
            interrupt,
        };
        let last = run == options.runs;
        count = 0;
        for item in plan.evaluate(input)? {
            let item = item?;
            count += 1;
            if last {
                out.write(&render(tree, &item))?;
            }
        }
    }
    drop(guard);
    let evaluating = eval_started.elapsed() / options.runs;

    debug!(target: "arbor::query", query, items = count, "query evaluated");

    if !options.info {
        return Ok(format!("Query executed: {} item(s).", count));
    }
    Ok(format!(
        "Parsing: {}\nCompiling: {}\nEvaluating: {}\nTotal Time: {}\nResults: {} item(s)",
        millis(stats.parse),
        millis(stats.compile),
        millis(evaluating),
        millis(started.elapsed()),
        count
    ))
}

/// Handle `Run`: read a query file and evaluate it like `XQuery`.
pub fn run(
    executor: &Executor,
    ctx: &mut Context,
    path: &str,
    out: &mut Output<'_>,
) -> Result<String> {
    let query = std::fs::read_to_string(path).map_err(|e| Error::Io {
        reason: format!("cannot read '{}': {}", path, e),
    })?;
    xquery(executor, ctx, query.trim(), out)
}

fn millis(d: Duration) -> String {
    format!("{:.2} ms", d.as_secs_f64() * 1000.0)
}
