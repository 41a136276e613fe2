//! Database catalogue
//!
//! The [`Store`] maps database names to shared [`Database`] handles. It is a
//! `DashMap`, so lookups from many sessions do not contend with each other.
//! Creation uses the entry API and dropping removes the exact handle that was
//! checked, which keeps both operations atomic per name.

use std::sync::Arc;
use std::time::Duration;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::info;

use arbor_core::{DatabaseName, Error, Interrupt, Result};

use crate::database::Database;
use crate::tree::Tree;

/// Summary row returned by [`Store::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseSummary {
    /// Database name
    pub name: String,
    /// Node count
    pub size: usize,
}

/// In-memory catalogue of databases
#[derive(Debug)]
pub struct Store {
    databases: DashMap<String, Arc<Database>>,
    poll: Duration,
}

impl Store {
    /// Create an empty store. `poll` bounds every interruptible lock wait.
    pub fn new(poll: Duration) -> Self {
        Self {
            databases: DashMap::new(),
            poll,
        }
    }

    /// Add a database built from `tree`
    pub fn create(&self, name: &DatabaseName, tree: Tree) -> Result<Arc<Database>> {
        match self.databases.entry(name.as_str().to_string()) {
            Entry::Occupied(_) => Err(Error::DatabaseExists(name.to_string())),
            Entry::Vacant(slot) => {
                let db = Arc::new(Database::new(name.as_str(), tree, self.poll));
                info!(target: "arbor::db", db = %name, size = db.size(), "database created");
                slot.insert(Arc::clone(&db));
                Ok(db)
            }
        }
    }

    /// Look up a database
    pub fn open(&self, name: &DatabaseName) -> Result<Arc<Database>> {
        self.databases
            .get(name.as_str())
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| Error::DatabaseNotFound(name.to_string()))
    }

    /// Whether a database exists
    pub fn exists(&self, name: &DatabaseName) -> bool {
        self.databases.contains_key(name.as_str())
    }

    /// Remove a database.
    ///
    /// `own_pins` is the number of pins the caller itself holds (0 or 1).
    /// Any further holder makes the drop fail with `DatabaseInUse`. The
    /// exclusive lock is taken first so an in-flight reader finishes before
    /// the database disappears.
    pub fn drop_database(
        &self,
        name: &DatabaseName,
        own_pins: usize,
        interrupt: &Interrupt,
    ) -> Result<()> {
        let db = self.open(name)?;
        {
            let _guard = db.exclusive(interrupt)?;
            db.mark_dropped(own_pins)?;
        }
        self.databases
            .remove_if(name.as_str(), |_, current| Arc::ptr_eq(current, &db));
        info!(target: "arbor::db", db = %name, "database dropped");
        Ok(())
    }

    /// All databases, sorted by name
    pub fn list(&self) -> Vec<DatabaseSummary> {
        let mut rows: Vec<DatabaseSummary> = self
            .databases
            .iter()
            .map(|entry| DatabaseSummary {
                name: entry.key().clone(),
                size: entry.value().size(),
            })
            .collect();
        rows.sort_by(|a, b| a.name.cmp(&b.name));
        rows
    }

    /// Number of databases
    pub fn len(&self) -> usize {
        self.databases.len()
    }

    /// Whether the store holds no databases
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(Duration::from_millis(10))
    }
}
