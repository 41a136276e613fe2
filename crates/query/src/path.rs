//! Path-expression engine
//!
//! [`PathEngine`] implements [`QueryEngine`] for a small XPath-like language:
//! literals, `.`, `..`, `/`, `//`, name and kind tests, `@` attributes and one
//! positional predicate per step.
//!
//! ## Evaluation
//!
//! All steps but the last are materialized into a sorted, duplicate-free node
//! list. The last step is streamed when it starts from a single context node,
//! which covers the common `//name` and `/a/b` shapes; with several context
//! nodes its results are collected and sorted into document order first.

use std::iter;
use std::time::Instant;

use tracing::debug;

use arbor_core::{Interrupt, Item, NodeId, NodeKind};
use arbor_storage::Tree;

use crate::engine::{CompileStats, EvalInput, ItemIter, Plan, QueryEngine};
use crate::error::{QueryError, Result};
use crate::parser::{parse, Axis, Expr, NodeTest, PathExpr, RawStep};

/// Engine for the built-in path language
#[derive(Debug, Default, Clone, Copy)]
pub struct PathEngine;

impl PathEngine {
    /// Create the engine
    pub fn new() -> Self {
        Self
    }
}

impl QueryEngine for PathEngine {
    fn compile(&self, text: &str) -> Result<Box<dyn Plan>> {
        let started = Instant::now();
        let expr = parse(text)?;
        let parsed = Instant::now();
        let body = match expr {
            Expr::Integer(i) => Body::Literal(Item::Integer(i)),
            Expr::Str(s) => Body::Literal(Item::String(s)),
            Expr::Path(path) => Body::Path(lower(path)),
        };
        let stats = CompileStats {
            parse: parsed - started,
            compile: parsed.elapsed(),
        };
        debug!(target: "arbor::query", query = text, ?stats, "compiled");
        Ok(Box::new(PathPlan { body, stats }))
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Step {
    axis: Axis,
    test: NodeTest,
    position: Option<usize>,
}

#[derive(Debug, Clone, PartialEq)]
struct Path {
    absolute: bool,
    steps: Vec<Step>,
}

#[derive(Debug)]
enum Body {
    Literal(Item),
    Path(Path),
}

/// Compiled path query
#[derive(Debug)]
pub struct PathPlan {
    body: Body,
    stats: CompileStats,
}

/// Turn `//` into explicit axes.
///
/// `//name` without a predicate becomes one descendant step. Everything else
/// keeps XPath's `descendant-or-self::node()/step` meaning, which matters for
/// positional predicates (`//li[1]` is the first `li` of every parent).
fn lower(path: PathExpr) -> Path {
    let mut steps = Vec::with_capacity(path.steps.len());
    for RawStep {
        deep,
        axis,
        test,
        position,
    } in path.steps
    {
        if deep {
            if axis == Axis::Child && position.is_none() {
                steps.push(Step {
                    axis: Axis::Descendant,
                    test,
                    position,
                });
                continue;
            }
            steps.push(Step {
                axis: Axis::DescendantOrSelf,
                test: NodeTest::Node,
                position: None,
            });
        }
        steps.push(Step {
            axis,
            test,
            position,
        });
    }
    Path {
        absolute: path.absolute,
        steps,
    }
}

fn matches(tree: &Tree, axis: Axis, test: &NodeTest, id: NodeId) -> bool {
    let Some(kind) = tree.kind(id) else {
        return false;
    };
    // principal node kind: attributes on the attribute axis, elements elsewhere
    let principal = if axis == Axis::Attribute {
        NodeKind::Attribute
    } else {
        NodeKind::Element
    };
    match test {
        NodeTest::Node => true,
        NodeTest::Any => kind == principal,
        NodeTest::Name(name) => kind == principal && tree.name(id) == Some(name.as_str()),
        NodeTest::Text => kind == NodeKind::Text,
        NodeTest::Comment => kind == NodeKind::Comment,
        NodeTest::ProcessingInstruction => kind == NodeKind::ProcessingInstruction,
    }
}

/// Nodes reached by `step` from one context node, in axis order
fn step_from<'a>(tree: &'a Tree, step: &'a Step, node: NodeId) -> Box<dyn Iterator<Item = NodeId> + 'a> {
    let candidates: Box<dyn Iterator<Item = NodeId> + 'a> = match step.axis {
        Axis::Child => Box::new(tree.children(node).iter().copied()),
        Axis::Descendant => Box::new(tree.descendants(node)),
        Axis::DescendantOrSelf => Box::new(iter::once(node).chain(tree.descendants(node))),
        Axis::Attribute => Box::new(tree.attributes(node).iter().copied()),
        Axis::SelfNode => Box::new(iter::once(node)),
        Axis::Parent => Box::new(tree.parent(node).into_iter()),
    };
    let filtered = candidates.filter(move |id| matches(tree, step.axis, &step.test, *id));
    match step.position {
        Some(p) => Box::new(filtered.skip(p - 1).take(1)),
        None => Box::new(filtered),
    }
}

fn apply_step(tree: &Tree, step: &Step, context: &[NodeId], interrupt: &Interrupt) -> Result<Vec<NodeId>> {
    let mut out = Vec::new();
    for node in context {
        interrupt.check()?;
        out.extend(step_from(tree, step, *node));
    }
    tree.sort_document_order(&mut out);
    Ok(out)
}

impl PathPlan {
    fn evaluate_path<'a>(&'a self, path: &'a Path, input: EvalInput<'a>) -> Result<ItemIter<'a>> {
        let tree = input.tree.ok_or_else(|| {
            QueryError::Evaluation("no database opened; path expressions need a context".to_string())
        })?;

        let mut context: Vec<NodeId> = if path.absolute {
            vec![NodeId::ROOT]
        } else {
            let mut nodes = input.context.to_vec();
            tree.sort_document_order(&mut nodes);
            nodes
        };

        let Some((last, init)) = path.steps.split_last() else {
            return Ok(nodes_iter(context, input.interrupt));
        };

        for step in init {
            context = apply_step(tree, step, &context, input.interrupt)?;
        }

        if context.len() == 1 {
            let interrupt = input.interrupt;
            let stream = step_from(tree, last, context[0]).map(move |id| {
                interrupt.check()?;
                Ok(Item::Node(id))
            });
            Ok(Box::new(stream))
        } else {
            let nodes = apply_step(tree, last, &context, input.interrupt)?;
            Ok(nodes_iter(nodes, input.interrupt))
        }
    }
}

fn nodes_iter(nodes: Vec<NodeId>, interrupt: &Interrupt) -> ItemIter<'_> {
    Box::new(nodes.into_iter().map(move |id| {
        interrupt.check()?;
        Ok(Item::Node(id))
    }))
}

impl Plan for PathPlan {
    fn evaluate<'a>(&'a self, input: EvalInput<'a>) -> Result<ItemIter<'a>> {
        match &self.body {
            Body::Literal(item) => Ok(Box::new(iter::once(Ok(item.clone())))),
            Body::Path(path) => self.evaluate_path(path, input),
        }
    }

    fn needs_tree(&self) -> bool {
        matches!(self.body, Body::Path(_))
    }

    fn stats(&self) -> CompileStats {
        self.stats
    }
}
