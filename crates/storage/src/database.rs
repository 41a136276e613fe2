//! Open database handle
//!
//! A [`Database`] is shared (`Arc`) between every context that has it open.
//! Access is split in two:
//!
//! - **Tree lock**: a `parking_lot::RwLock` around the document. Readers
//!   share it for the length of a traversal; structural mutations take it
//!   exclusively through [`Database::write_with`].
//! - **Pin state**: a small mutex holding the number of contexts that have the
//!   database open and whether it has been dropped. Dropping checks the pins
//!   and marks the database dead under this one mutex, so no context can pin
//!   a database that is being removed.
//!
//! Exclusive waits poll the caller's [`Interrupt`] so that a terminated
//! session does not stay parked behind a long reader.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::{debug, warn};

use arbor_core::{Error, Interrupt, Result};

use crate::tree::Tree;

#[derive(Debug, Default)]
struct PinState {
    pins: usize,
    dropped: bool,
}

/// One named XML database
#[derive(Debug)]
pub struct Database {
    name: String,
    tree: RwLock<Tree>,
    state: Mutex<PinState>,
    created_at: DateTime<Utc>,
    updates: AtomicU64,
    poll: Duration,
}

impl Database {
    /// Wrap a parsed tree
    pub fn new(name: impl Into<String>, tree: Tree, poll: Duration) -> Self {
        Self {
            name: name.into(),
            tree: RwLock::new(tree),
            state: Mutex::new(PinState::default()),
            created_at: Utc::now(),
            updates: AtomicU64::new(0),
            poll,
        }
    }

    /// Database name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Creation timestamp
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Number of committed mutations
    pub fn updates(&self) -> u64 {
        self.updates.load(Ordering::Relaxed)
    }

    /// Node count. Takes the read lock briefly.
    pub fn size(&self) -> usize {
        self.tree.read().size()
    }

    /// Shared access to the tree
    pub fn read(&self) -> RwLockReadGuard<'_, Tree> {
        self.tree.read()
    }

    /// Shared access, giving up when `interrupt` is raised while waiting
    pub fn read_interruptible(&self, interrupt: &Interrupt) -> Result<RwLockReadGuard<'_, Tree>> {
        loop {
            interrupt.check()?;
            if let Some(guard) = self.tree.try_read_for(self.poll) {
                return Ok(guard);
            }
        }
    }

    fn lock_exclusive(&self, interrupt: &Interrupt) -> Result<RwLockWriteGuard<'_, Tree>> {
        loop {
            interrupt.check()?;
            if let Some(guard) = self.tree.try_write_for(self.poll) {
                return Ok(guard);
            }
            debug!(target: "arbor::db", db = %self.name, "waiting for exclusive lock");
        }
    }

    /// Run a structural mutation under the exclusive lock.
    ///
    /// `f` works on a staged copy of the tree. The copy replaces the live tree
    /// only when `f` returns `Ok`, so a failing mutation leaves no trace.
    pub fn write_with<T, E, F>(&self, interrupt: &Interrupt, f: F) -> std::result::Result<T, E>
    where
        E: From<Error>,
        F: FnOnce(&mut Tree) -> std::result::Result<T, E>,
    {
        let mut guard = self.lock_exclusive(interrupt)?;
        if self.is_dropped() {
            return Err(Error::DatabaseNotFound(self.name.clone()).into());
        }

        let mut staged = guard.clone();
        let out = f(&mut staged)?;
        interrupt.check()?;
        *guard = staged;
        self.updates.fetch_add(1, Ordering::Relaxed);
        Ok(out)
    }

    /// Register one more holder. Fails once the database is dropped.
    pub fn pin(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.dropped {
            return Err(Error::DatabaseNotFound(self.name.clone()));
        }
        state.pins += 1;
        Ok(())
    }

    /// Release one holder
    pub fn unpin(&self) {
        let mut state = self.state.lock();
        match state.pins.checked_sub(1) {
            Some(pins) => state.pins = pins,
            None => warn!(target: "arbor::db", db = %self.name, "unpin without matching pin"),
        }
    }

    /// Current number of holders
    pub fn pins(&self) -> usize {
        self.state.lock().pins
    }

    /// Whether the database has been dropped
    pub fn is_dropped(&self) -> bool {
        self.state.lock().dropped
    }

    /// Mark the database dropped unless holders other than the caller's own
    /// `own_pins` have it open.
    pub(crate) fn mark_dropped(&self, own_pins: usize) -> Result<()> {
        let mut state = self.state.lock();
        if state.dropped {
            return Err(Error::DatabaseNotFound(self.name.clone()));
        }
        if state.pins > own_pins {
            return Err(Error::DatabaseInUse {
                name: self.name.clone(),
                holders: state.pins - own_pins,
            });
        }
        state.dropped = true;
        Ok(())
    }

    /// Exclusive lock used by the store while dropping
    pub(crate) fn exclusive(&self, interrupt: &Interrupt) -> Result<RwLockWriteGuard<'_, Tree>> {
        self.lock_exclusive(interrupt)
    }
}
