//! Registry of live sessions.
//!
//! The registry is the only process-wide mutable state of a server instance:
//! one `parking_lot::Mutex` around a map of session handles. Kill operations
//! take a snapshot under the lock and terminate outside it, so a session
//! that deregisters itself concurrently never deadlocks or double-counts.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::session::{Session, SessionId};

/// Set of live sessions
#[derive(Debug, Default)]
pub struct SessionRegistry {
    members: Mutex<HashMap<SessionId, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a session. Returns `false` and leaves the registry unchanged if the
    /// session is already terminated.
    pub fn register(&self, session: Arc<Session>) -> bool {
        let id = session.id();
        let mut members = self.members.lock();
        if !session.is_active() {
            warn!(target: "arbor::session", session = %id, "refusing to register a terminated session");
            return false;
        }
        members.insert(id, session);
        drop(members);
        info!(target: "arbor::session", session = %id, "session registered");
        true
    }

    /// Remove a session. Removing an unknown id is a no-op.
    pub fn deregister(&self, id: SessionId) -> bool {
        let removed = self.members.lock().remove(&id).is_some();
        if removed {
            info!(target: "arbor::session", session = %id, "session deregistered");
        }
        removed
    }

    /// Terminate and remove every member. Returns the snapshot size.
    pub fn kill_all(&self) -> usize {
        let snapshot: Vec<Arc<Session>> = self.members.lock().values().cloned().collect();

        for session in &snapshot {
            if !session.terminate() {
                warn!(target: "arbor::session", session = %session.id(), "session already terminated");
            }
            self.deregister(session.id());
        }

        info!(target: "arbor::session", count = snapshot.len(), "sessions killed");
        snapshot.len()
    }

    /// Number of live sessions
    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    /// Whether no session is registered
    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Ids of the live sessions
    pub fn ids(&self) -> Vec<SessionId> {
        self.members.lock().keys().copied().collect()
    }

    /// Look up a session
    pub fn get(&self, id: SessionId) -> Option<Arc<Session>> {
        self.members.lock().get(&id).cloned()
    }
}
