//! Query collaborator interface
//!
//! The command layer only sees these two traits. A [`QueryEngine`] turns text
//! into a [`Plan`]; a plan evaluates against one tree snapshot and yields
//! items lazily. The iterator borrows the tree, so the caller keeps its read
//! guard alive for exactly as long as it pulls items.

use std::fmt;
use std::time::Duration;

use arbor_core::{Interrupt, Item, NodeId};
use arbor_storage::Tree;

use crate::error::Result;

/// Lazy, forward-only item sequence
pub type ItemIter<'a> = Box<dyn Iterator<Item = Result<Item>> + 'a>;

/// Everything a plan needs to evaluate
#[derive(Clone, Copy)]
pub struct EvalInput<'a> {
    /// Tree of the open database, `None` when no database is open
    pub tree: Option<&'a Tree>,
    /// Context node sequence (the session's current selection)
    pub context: &'a [NodeId],
    /// Checked between items
    pub interrupt: &'a Interrupt,
}

impl fmt::Debug for EvalInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EvalInput")
            .field("has_tree", &self.tree.is_some())
            .field("context", &self.context.len())
            .finish()
    }
}

/// Time spent turning text into a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileStats {
    /// Tokenizing and parsing
    pub parse: Duration,
    /// Lowering the syntax tree into the executable plan
    pub compile: Duration,
}

/// Compiles query text
pub trait QueryEngine: Send + Sync {
    /// Compile `text`. Syntax errors are reported as `QueryError::Compile`.
    fn compile(&self, text: &str) -> Result<Box<dyn Plan>>;
}

/// Compiled, reusable query
pub trait Plan: Send + fmt::Debug {
    /// Start evaluation. Items are produced as the iterator is pulled.
    fn evaluate<'a>(&'a self, input: EvalInput<'a>) -> Result<ItemIter<'a>>;

    /// Whether evaluation reads the database tree
    fn needs_tree(&self) -> bool {
        true
    }

    /// Compilation timings
    fn stats(&self) -> CompileStats {
        CompileStats::default()
    }
}
