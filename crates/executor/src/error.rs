//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Readable**: The `Display` text is the info sentence a failed command
//!   reports back to its client
//!
//! Storage and query errors are folded into this taxonomy by the `From`
//! implementations at the bottom of this file.

use serde::{Deserialize, Serialize};

use arbor_query::QueryError;
use arbor_security::Permission;

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Access | `PermissionDenied` | Identity below the required level |
/// | Validation | `Validation` | Bad argument, rejected before any lookup |
/// | Lookup | `NotFound`, `AlreadyOpen`, `Conflict` | Catalogue and context state |
/// | Query | `Compile`, `Evaluation` | Query collaborator failures |
/// | System | `Io`, `Interrupted`, `Terminated` | Infrastructure and lifecycle |
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Access ====================
    /// Identity is below the command's required level.
    ///
    /// The message is the same for every command; the fields carry the detail.
    #[error("permission denied")]
    PermissionDenied {
        /// Command name
        command: String,
        /// Level the command needs
        required: Permission,
    },

    // ==================== Validation ====================
    /// Malformed or missing argument
    #[error("invalid argument: {reason}")]
    Validation {
        /// What was wrong
        reason: String,
    },

    // ==================== Lookup ====================
    /// Database, node or open database missing
    #[error("{reason}")]
    NotFound {
        /// What was missing
        reason: String,
    },

    /// The database is already open in this context
    #[error("database '{name}' is already open")]
    AlreadyOpen {
        /// Database name
        name: String,
    },

    /// Existing database, or a database held by another session
    #[error("conflict: {reason}")]
    Conflict {
        /// What conflicted
        reason: String,
    },

    // ==================== Query ====================
    /// Query text does not compile
    #[error("query error: {reason}")]
    Compile {
        /// Diagnostic
        reason: String,
    },

    /// Query failed while producing results
    #[error("evaluation error: {reason}")]
    Evaluation {
        /// Diagnostic
        reason: String,
    },

    // ==================== System ====================
    /// Reading input or writing output failed
    #[error("I/O error: {reason}")]
    Io {
        /// Underlying error text
        reason: String,
    },

    /// The command was interrupted by session termination
    #[error("command interrupted")]
    Interrupted,

    /// The session was terminated before the command started
    #[error("session terminated")]
    Terminated,
}

impl Error {
    /// Shorthand for a validation failure
    pub fn validation(reason: impl Into<String>) -> Self {
        Error::Validation {
            reason: reason.into(),
        }
    }

    /// Failure for commands that need an open database
    pub fn no_database() -> Self {
        Error::NotFound {
            reason: "no database opened".to_string(),
        }
    }

    /// Wrap an I/O error
    pub fn io(err: &std::io::Error) -> Self {
        Error::Io {
            reason: err.to_string(),
        }
    }
}

impl From<arbor_core::Error> for Error {
    fn from(err: arbor_core::Error) -> Self {
        use arbor_core::Error as E;
        match err {
            E::IoError(e) => Error::io(&e),
            E::DatabaseNotFound(_) | E::NodeNotFound(_) => Error::NotFound {
                reason: err.to_string(),
            },
            E::DatabaseExists(_) | E::DatabaseInUse { .. } => Error::Conflict {
                reason: err.to_string(),
            },
            E::InvalidName(e) => Error::validation(e.to_string()),
            E::Parse(reason) => Error::validation(reason),
            E::InvalidOperation(reason) => Error::validation(reason),
            E::Interrupted => Error::Interrupted,
        }
    }
}

impl From<QueryError> for Error {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Compile { .. } => Error::Compile {
                reason: err.to_string(),
            },
            QueryError::Evaluation(reason) => Error::Evaluation { reason },
            QueryError::Interrupted => Error::Interrupted,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::io(&err)
    }
}
