//! Query errors

use thiserror::Error;

/// Result type alias for query operations
pub type Result<T> = std::result::Result<T, QueryError>;

/// Failure while compiling or evaluating a query
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// The query text is not a valid expression
    #[error("{message} (at offset {offset})")]
    Compile {
        /// Diagnostic
        message: String,
        /// Byte offset in the query text
        offset: usize,
    },

    /// Evaluation failed at runtime
    #[error("{0}")]
    Evaluation(String),

    /// Evaluation was stopped by the session
    #[error("query interrupted")]
    Interrupted,
}

impl From<arbor_core::Error> for QueryError {
    fn from(err: arbor_core::Error) -> Self {
        match err {
            arbor_core::Error::Interrupted => QueryError::Interrupted,
            other => QueryError::Evaluation(other.to_string()),
        }
    }
}
