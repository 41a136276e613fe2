//! Query layer for ArborDB
//!
//! The command layer talks to queries through two traits:
//! - [`QueryEngine`]: compiles text into a plan
//! - [`Plan`]: evaluates lazily against one tree snapshot
//!
//! [`PathEngine`] is the built-in implementation. It understands a compact
//! path language (literals, `/`, `//`, `.`, `..`, name and kind tests,
//! attributes and positional predicates), which is enough to drive selection
//! and query commands end to end.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod engine;
pub mod error;
mod lexer;
mod parser;
pub mod path;

pub use engine::{CompileStats, EvalInput, ItemIter, Plan, QueryEngine};
pub use error::{QueryError, Result};
pub use path::{PathEngine, PathPlan};
