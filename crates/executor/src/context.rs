//! Per-session database context.
//!
//! A [`Context`] holds what a session is currently looking at: the open
//! database (shared with other sessions through an `Arc`), the selected nodes
//! in it, the identity commands run as, and the session's options.
//!
//! # Invariants
//!
//! - The selection is empty whenever no database is open.
//! - Opening selects the document node; closing or dropping clears it.
//! - Every open database is pinned exactly once by the context holding it.
//! - Failed operations leave the context unchanged.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use arbor_core::{DatabaseName, Interrupt, NodeId};
use arbor_security::Identity;
use arbor_storage::{Database, Store};

use crate::config::ArborConfig;
use crate::session::SessionId;
use crate::{Error, Result};

/// Session options changed by the `Set` command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Report query timings
    pub info: bool,
    /// Drop whitespace-only text when parsing
    pub chop: bool,
    /// Evaluations per query
    pub runs: u32,
}

impl Default for Options {
    fn default() -> Self {
        Self::from(&ArborConfig::default())
    }
}

impl From<&ArborConfig> for Options {
    fn from(config: &ArborConfig) -> Self {
        Self {
            info: config.query_info,
            chop: config.chop,
            runs: config.runs,
        }
    }
}

/// Current database, selection, identity and options of one session
#[derive(Debug)]
pub struct Context {
    database: Option<Arc<Database>>,
    selection: Arc<Vec<NodeId>>,
    identity: Identity,
    options: Options,
    interrupt: Interrupt,
    session: Option<SessionId>,
}

impl Context {
    /// Create a context with nothing open
    pub fn new(identity: Identity, options: Options) -> Self {
        Self {
            database: None,
            selection: Arc::new(Vec::new()),
            identity,
            options,
            interrupt: Interrupt::new(),
            session: None,
        }
    }

    /// Bind the context to its owning session
    pub(crate) fn bind(mut self, session: SessionId, interrupt: Interrupt) -> Self {
        self.session = Some(session);
        self.interrupt = interrupt;
        self
    }

    /// Identity commands run as
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Session options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Mutable session options
    pub fn options_mut(&mut self) -> &mut Options {
        &mut self.options
    }

    /// Interrupt flag of the owning session
    pub fn interrupt(&self) -> &Interrupt {
        &self.interrupt
    }

    /// Owning session, if any
    pub fn session(&self) -> Option<SessionId> {
        self.session
    }

    /// The open database
    pub fn database(&self) -> Option<&Arc<Database>> {
        self.database.as_ref()
    }

    /// The open database, or `NotFound` when none is open
    pub fn require_database(&self) -> Result<&Arc<Database>> {
        self.database.as_ref().ok_or_else(Error::no_database)
    }

    /// Current selection as an immutable shared list
    pub fn selection(&self) -> Arc<Vec<NodeId>> {
        Arc::clone(&self.selection)
    }

    /// Replace the selection as a whole
    pub fn set_selection(&mut self, nodes: Vec<NodeId>) {
        self.selection = Arc::new(nodes);
    }

    /// Open `name` from `store`.
    ///
    /// Fails with `AlreadyOpen` when it is the current database, leaving the
    /// selection as is.
    pub fn open_database(&mut self, store: &Store, name: &DatabaseName) -> Result<Arc<Database>> {
        if let Some(current) = &self.database {
            if current.name() == name.as_str() {
                return Err(Error::AlreadyOpen {
                    name: name.to_string(),
                });
            }
        }
        let db = store.open(name)?;
        self.attach(Arc::clone(&db))?;
        Ok(db)
    }

    /// Make `db` the current database, closing any previous one
    pub(crate) fn attach(&mut self, db: Arc<Database>) -> Result<()> {
        db.pin()?;
        self.close_database();
        debug!(target: "arbor::session", session = ?self.session, db = db.name(), "database opened");
        self.database = Some(db);
        self.selection = Arc::new(vec![NodeId::ROOT]);
        Ok(())
    }

    /// Select the document node of the open database again
    pub(crate) fn reset_selection(&mut self) {
        if self.database.is_some() {
            self.selection = Arc::new(vec![NodeId::ROOT]);
        }
    }

    /// Close the current database. Returns whether one was open.
    pub fn close_database(&mut self) -> bool {
        match self.database.take() {
            Some(db) => {
                db.unpin();
                self.selection = Arc::new(Vec::new());
                debug!(target: "arbor::session", session = ?self.session, db = db.name(), "database closed");
                true
            }
            None => false,
        }
    }

    /// Drop `name` from `store`, closing it here first if it is current.
    ///
    /// The context's own pin does not count as a conflict; pins held by other
    /// sessions do.
    pub fn drop_database(&mut self, store: &Store, name: &DatabaseName) -> Result<()> {
        let own_pins = match &self.database {
            Some(db) if db.name() == name.as_str() => 1,
            _ => 0,
        };
        store.drop_database(name, own_pins, &self.interrupt)?;
        if own_pins == 1 {
            self.close_database();
        }
        Ok(())
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.close_database();
    }
}
