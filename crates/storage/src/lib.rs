//! Storage layer for ArborDB
//!
//! This crate implements the in-memory XML store used by the command layer:
//! - Tree: arena-backed document tree with stable node ids
//! - xml: quick-xml based parsing of documents/fragments and serialization
//! - Database: shared handle with a readers-writer lock and holder pins
//! - Store: DashMap catalogue of named databases
//!
//! # Concurrency
//!
//! Readers share the per-database `RwLock` for a whole traversal. Writers
//! stage their changes on a copy and swap it in under the exclusive lock,
//! so a reader never observes a half-applied update.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod database;
pub mod store;
pub mod tree;
pub mod xml;

pub use database::Database;
pub use store::{DatabaseSummary, Store};
pub use tree::{Descendants, Node, Tree};
pub use xml::{parse_document, parse_fragment, serialize};
