//! Server instance.
//!
//! [`Arbor`] owns everything sessions share: the database store, the query
//! engine, the session registry and the configuration (all reached through
//! one [`Executor`]). Sessions created through it are registered, so `Kill`
//! and [`Arbor::shutdown`] can reach them.
//!
//! # Example
//!
//! ```ignore
//! use arbordb::{Arbor, ArborConfig, Command, Identity, NullSink};
//!
//! let arbor = Arbor::open(ArborConfig::default())?;
//! let session = arbor.session(Identity::admin());
//! session.execute(Command::CreateDb {
//!     input: "<doc/>".into(),
//!     name: Some("doc".into()),
//! }, &mut NullSink)?;
//! session.disconnect();
//! ```

use std::path::Path;
use std::sync::mpsc::Receiver;
use std::sync::Arc;

use tracing::info;

use arbor_query::{PathEngine, QueryEngine};
use arbor_security::Identity;
use arbor_storage::Store;

use crate::config::ArborConfig;
use crate::output::ChannelSink;
use crate::registry::SessionRegistry;
use crate::session::Session;
use crate::{Executor, Result};

/// One server instance
pub struct Arbor {
    executor: Arc<Executor>,
}

impl Arbor {
    /// Start an instance with the built-in path engine.
    pub fn open(config: ArborConfig) -> Result<Self> {
        Self::with_engine(config, Arc::new(PathEngine::new()))
    }

    /// Start an instance from an `arbor.toml` file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::open(ArborConfig::from_file(path)?)
    }

    /// Start an instance with the default configuration.
    pub fn open_default() -> Self {
        Self::build(ArborConfig::default(), Arc::new(PathEngine::new()))
    }

    /// Start an instance with a custom query engine.
    pub fn with_engine(config: ArborConfig, engine: Arc<dyn QueryEngine>) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, engine))
    }

    fn build(config: ArborConfig, engine: Arc<dyn QueryEngine>) -> Self {
        let store = Arc::new(Store::new(config.interrupt_poll()));
        let registry = Arc::new(SessionRegistry::new());
        info!(target: "arbor::session", ?config, "server instance started");
        Self {
            executor: Arc::new(Executor::new(store, engine, registry, config)),
        }
    }

    /// The shared executor
    pub fn executor(&self) -> &Arc<Executor> {
        &self.executor
    }

    /// Live sessions
    pub fn registry(&self) -> &SessionRegistry {
        self.executor.registry()
    }

    /// Database catalogue
    pub fn store(&self) -> &Store {
        self.executor.store()
    }

    /// Open a registered session for `identity`.
    pub fn session(&self, identity: Identity) -> Arc<Session> {
        let session = Arc::new(Session::new(Arc::clone(&self.executor), identity));
        self.registry().register(Arc::clone(&session));
        session
    }

    /// Open a registered session with the configured default permission.
    pub fn connect(&self, user: &str) -> Result<Arc<Session>> {
        let permission = self.executor.config().permission()?;
        Ok(self.session(Identity::new(user, permission)))
    }

    /// Output channel sized by `output_buffer`, for a consumer on another thread.
    pub fn output_channel(&self) -> (ChannelSink, Receiver<String>) {
        ChannelSink::new(self.executor.config().output_buffer)
    }

    /// Terminate every session. Returns how many were live.
    pub fn shutdown(&self) -> usize {
        self.registry().kill_all()
    }
}

impl Drop for Arbor {
    fn drop(&mut self) {
        // sessions hold the executor, which holds the registry holding them
        self.shutdown();
    }
}
