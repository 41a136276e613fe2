//! Client sessions.
//!
//! A [`Session`] is one client's execution channel: a fixed identity, one
//! [`Context`] and a lifecycle state. Commands of a session run one at a time
//! under the context mutex.
//!
//! # Termination
//!
//! [`Session::terminate`] may be called from any thread, including while a
//! command of the session is running. It
//! 1. flips the state to `Terminated` (only the first call does anything),
//! 2. raises the interrupt flag, so lock waits and query evaluation stop,
//! 3. closes the context if it is idle. Otherwise the running command closes
//!    it on its way out.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use arbor_core::Interrupt;
use arbor_security::Identity;

use crate::context::{Context, Options};
use crate::output::{CommandResult, OutputSink};
use crate::{Command, Error, Executor, Result};

/// Opaque session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state; `Terminated` is absorbing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionState {
    /// Accepting commands
    Active,
    /// Rejecting commands
    Terminated,
}

const ACTIVE: u8 = 0;
const TERMINATED: u8 = 1;

/// One client's execution channel
pub struct Session {
    id: SessionId,
    identity: Identity,
    context: Mutex<Context>,
    state: AtomicU8,
    interrupt: Interrupt,
    executor: Arc<Executor>,
    started_at: DateTime<Utc>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("user", &self.identity.user)
            .field("state", &self.state())
            .finish()
    }
}

impl Session {
    /// Create an active session. It is not registered; see
    /// [`crate::Arbor::session`] for registered sessions.
    pub fn new(executor: Arc<Executor>, identity: Identity) -> Self {
        let id = SessionId::new();
        let interrupt = Interrupt::new();
        let options = Options::from(executor.config());
        let context = Context::new(identity.clone(), options).bind(id, interrupt.clone());
        Self {
            id,
            identity,
            context: Mutex::new(context),
            state: AtomicU8::new(ACTIVE),
            interrupt,
            executor,
            started_at: Utc::now(),
        }
    }

    /// Session id
    pub fn id(&self) -> SessionId {
        self.id
    }

    /// Identity commands run as
    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// When the session was created
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        if self.state.load(Ordering::SeqCst) == TERMINATED {
            SessionState::Terminated
        } else {
            SessionState::Active
        }
    }

    /// Whether the session still accepts commands
    pub fn is_active(&self) -> bool {
        self.state() == SessionState::Active
    }

    /// Execute a command.
    ///
    /// Returns the info sentence on success. A terminated session fails with
    /// `Terminated` without touching its context.
    pub fn execute(&self, cmd: Command, sink: &mut dyn OutputSink) -> Result<String> {
        if !self.is_active() {
            return Err(Error::Terminated);
        }

        let result = {
            let mut ctx = self.context.lock();
            if !self.is_active() {
                Err(Error::Terminated)
            } else {
                self.executor.execute(&mut ctx, cmd, sink)
            }
        };

        // terminate() could not take the context while the command ran
        if !self.is_active() {
            self.release_context();
        }
        result
    }

    /// Execute a command and flatten the outcome into `(success, info)`.
    pub fn run(&self, cmd: Command, sink: &mut dyn OutputSink) -> CommandResult {
        self.execute(cmd, sink).into()
    }

    /// Read the context under the session lock.
    pub fn with_context<T>(&self, f: impl FnOnce(&Context) -> T) -> T {
        f(&*self.context.lock())
    }

    /// Terminate the session. Returns `false` if it was already terminated.
    pub fn terminate(&self) -> bool {
        if self
            .state
            .compare_exchange(ACTIVE, TERMINATED, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }
        self.interrupt.raise();
        self.release_context();
        info!(target: "arbor::session", session = %self.id, user = %self.identity.user, "session terminated");
        true
    }

    /// Terminate and leave the registry.
    pub fn disconnect(&self) {
        self.terminate();
        self.executor.registry().deregister(self.id);
    }

    fn release_context(&self) {
        if let Some(mut ctx) = self.context.try_lock() {
            if ctx.close_database() {
                debug!(target: "arbor::session", session = %self.id, "context released");
            }
        }
    }
}
