//! # Arbor Executor
//!
//! The command and session layer of ArborDB, an XML database server core.
//!
//! This is the only crate users need to import. It provides:
//! - [`Arbor`] - A server instance owning databases, sessions and configuration
//! - [`Session`] - One client's execution channel with its own [`Context`]
//! - [`Command`] - The closed set of operations, with permission levels
//! - [`SessionRegistry`] - Live sessions, with kill support
//!
//! ## Quick Start
//!
//! ```text
//! use arbordb::{Arbor, ArborConfig, BufferSink, Command, Identity};
//!
//! let arbor = Arbor::open(ArborConfig::default())?;
//! let session = arbor.session(Identity::admin());
//!
//! session.execute(Command::CreateDb { input: "input.xml".into(), name: None }, &mut sink)?;
//! session.execute(Command::XQuery { query: "//li".into() }, &mut sink)?;
//! ```
//!
//! ## Permissions
//!
//! | Level | Commands |
//! |-------|----------|
//! | READ | Open, Close, List, InfoDb, Info, Cs |
//! | WRITE | Insert, Update, Delete, Copy |
//! | STANDARD | CreateDb, DropDb, Set, XQuery, Run |
//! | ADMIN | Kill |

#![warn(missing_docs)]

mod arbor;
mod command;
mod config;
mod context;
mod error;
mod executor;
mod output;
mod registry;
mod session;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use arbor::Arbor;
pub use command::{Command, OptionValue, SetOption, UpdateKind};
pub use config::{ArborConfig, CONFIG_FILE_NAME};
pub use context::{Context, Options};
pub use error::Error;
pub use executor::Executor;
pub use output::{BufferSink, ChannelSink, CommandResult, NullSink, OutputSink};
pub use registry::SessionRegistry;
pub use session::{Session, SessionId, SessionState};

// Re-export collaborator types so users don't need the lower crates directly
pub use arbor_core::{DatabaseName, Interrupt, Item, NodeId, NodeKind};
pub use arbor_query::{PathEngine, Plan, QueryEngine, QueryError};
pub use arbor_security::{Identity, Permission};
pub use arbor_storage::{Database, Store, Tree};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
