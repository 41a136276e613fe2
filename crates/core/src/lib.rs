//! Core types for ArborDB
//!
//! This crate defines the foundational types shared by the storage, query
//! and executor layers:
//! - DatabaseName / QName validation
//! - NodeId / NodeKind: node identity within a database tree
//! - Item: opaque query result items
//! - Interrupt: cooperative cancellation flag for blocking operations
//! - Error: storage-level error hierarchy

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod interrupt;
pub mod item;
pub mod name;
pub mod node;

pub use error::{Error, Result};
pub use interrupt::Interrupt;
pub use item::Item;
pub use name::{validate_qname, DatabaseName, NameError, MAX_DATABASE_NAME_LENGTH};
pub use node::{NodeId, NodeKind};
