//! The Executor - single entry point for commands.
//!
//! The Executor is a stateless dispatcher: it holds the shared collaborators
//! (database store, query engine, session registry, configuration) and
//! routes each command to its handler. All per-client state lives in the
//! [`Context`] passed in by the caller.
//!
//! Every command goes through the same three stages:
//! 1. permission check against the context's identity,
//! 2. argument validation,
//! 3. dispatch by a single match on the command.

use std::sync::Arc;

use tracing::{debug, info, warn};

use arbor_query::QueryEngine;
use arbor_storage::Store;

use crate::command::database_name;
use crate::config::ArborConfig;
use crate::context::Context;
use crate::handlers;
use crate::output::{Output, OutputSink};
use crate::registry::SessionRegistry;
use crate::{Command, Error, Result};

/// The command executor.
///
/// # Thread Safety
///
/// Executor is `Send + Sync` and is shared by every session of a server
/// instance.
pub struct Executor {
    store: Arc<Store>,
    engine: Arc<dyn QueryEngine>,
    registry: Arc<SessionRegistry>,
    config: ArborConfig,
}

impl Executor {
    /// Create an executor over shared collaborators.
    pub fn new(
        store: Arc<Store>,
        engine: Arc<dyn QueryEngine>,
        registry: Arc<SessionRegistry>,
        config: ArborConfig,
    ) -> Self {
        Self {
            store,
            engine,
            registry,
            config,
        }
    }

    /// Database catalogue
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Query collaborator
    pub fn engine(&self) -> &dyn QueryEngine {
        self.engine.as_ref()
    }

    /// Live sessions
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Server configuration
    pub fn config(&self) -> &ArborConfig {
        &self.config
    }

    /// Execute a single command against `ctx`.
    ///
    /// Returns the info sentence on success. Payload goes to `sink`.
    pub fn execute(
        &self,
        ctx: &mut Context,
        cmd: Command,
        sink: &mut dyn OutputSink,
    ) -> Result<String> {
        let required = cmd.required_permission();
        if !ctx.identity().allows(required) {
            warn!(
                target: "arbor::cmd",
                command = cmd.name(),
                user = %ctx.identity().user,
                "permission denied"
            );
            return Err(Error::PermissionDenied {
                command: cmd.name().to_string(),
                required,
            });
        }
        cmd.validate()?;

        let name = cmd.name();
        let write = cmd.is_write();
        debug!(target: "arbor::cmd", command = name, write, session = ?ctx.session(), "executing");
        let mut out = Output::new(sink, ctx.interrupt().clone(), self.config.interrupt_poll());
        let result = self.dispatch(ctx, cmd, &mut out);
        match &result {
            Ok(_) if write => {
                info!(target: "arbor::cmd", command = name, user = %ctx.identity().user, "content changed")
            }
            Ok(_) => {}
            Err(e) => debug!(target: "arbor::cmd", command = name, write, error = %e, "command failed"),
        }
        result
    }

    fn dispatch(&self, ctx: &mut Context, cmd: Command, out: &mut Output<'_>) -> Result<String> {
        match cmd {
            // Database commands
            Command::CreateDb { input, name } => {
                handlers::database::create_db(self, ctx, &input, name.as_deref())
            }
            Command::Open { name } => handlers::database::open(self, ctx, &database_name(&name)?),
            Command::Close => handlers::database::close(ctx),
            Command::DropDb { name } => {
                handlers::database::drop_db(self, ctx, &database_name(&name)?)
            }
            Command::List => handlers::database::list(self, out),
            Command::InfoDb => handlers::database::info_db(ctx, out),
            Command::Info => handlers::admin::info(self, ctx, out),

            // Selection
            Command::Cs { query } => handlers::query::cs(self, ctx, &query),

            // Updates
            Command::Insert {
                kind,
                target,
                position,
                values,
            } => handlers::update::insert(self, ctx, kind.parse()?, &target, position, &values),
            Command::Update {
                kind,
                target,
                values,
            } => handlers::update::update(self, ctx, kind.parse()?, &target, &values),
            Command::Delete { target } => handlers::update::delete(self, ctx, &target),
            Command::Copy {
                source,
                target,
                position,
            } => handlers::update::copy(self, ctx, &source, &target, position),

            // Options
            Command::Set { option, value } => handlers::admin::set(ctx, option.parse()?, &value),

            // Queries
            Command::XQuery { query } => handlers::query::xquery(self, ctx, &query, out),
            Command::Run { path } => handlers::query::run(self, ctx, &path, out),

            // Administration
            Command::Kill => handlers::admin::kill(self, ctx),
        }
    }
}
