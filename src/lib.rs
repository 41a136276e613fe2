//! ArborDB: the command execution and session core of an XML database.
//!
//! Everything lives in [`arbor_executor`] and is re-exported here, so
//! applications depend on this one crate:
//!
//! ```ignore
//! use arbordb::{Arbor, ArborConfig, BufferSink, Command, Identity};
//!
//! let arbor = Arbor::open(ArborConfig::default())?;
//! let session = arbor.session(Identity::admin());
//! let mut sink = BufferSink::new();
//! session.execute(Command::CreateDb {
//!     input: "<doc><item/></doc>".into(),
//!     name: Some("doc".into()),
//! }, &mut sink)?;
//! session.execute(Command::XQuery { query: "//item".into() }, &mut sink)?;
//! ```

pub use arbor_executor::*;
