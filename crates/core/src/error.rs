//! Error types for the storage and query collaborators
//!
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//! The command layer maps these onto its own user-facing taxonomy.

use std::io;
use thiserror::Error;

use crate::name::NameError;
use crate::node::NodeId;

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the XML store
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error (reading input documents, query files)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// No database with this name exists
    #[error("database '{0}' was not found")]
    DatabaseNotFound(String),

    /// A database with this name already exists
    #[error("database '{0}' already exists")]
    DatabaseExists(String),

    /// Database is pinned by other sessions
    #[error("database '{name}' is opened by {holders} other session(s)")]
    DatabaseInUse {
        /// Database name
        name: String,
        /// Number of other holders
        holders: usize,
    },

    /// Invalid database or XML name
    #[error("invalid name: {0}")]
    InvalidName(#[from] NameError),

    /// Malformed XML input
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Node does not exist in the tree
    #[error("node {0} does not exist")]
    NodeNotFound(NodeId),

    /// Invalid operation or state
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// Waiting operation was interrupted by session termination
    #[error("operation interrupted")]
    Interrupted,
}
