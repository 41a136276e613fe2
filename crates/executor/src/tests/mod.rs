//! Executor test suite.
//!
//! Every test builds its own [`Arbor`] instance, so tests never share
//! databases or sessions.

mod query;
mod serialization;
mod session;

use std::sync::Arc;

use crate::{Arbor, BufferSink, Command, Identity, NullSink, Permission, Session};

/// Document used by most command tests: 11 nodes including the document node.
pub(crate) const INPUT: &str =
    "<html><head><title>T</title></head><body><ul><li>a</li><li>b</li></ul></body></html>";

pub(crate) const INPUT_SIZE: usize = 11;

pub(crate) const NAME: &str = "input";

/// Route log output through the test harness; repeated calls are no-ops.
pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Admin session on a fresh instance, with the fixture created and opened.
pub(crate) fn setup() -> (Arbor, Arc<Session>) {
    init_tracing();
    let arbor = Arbor::open_default();
    let session = arbor.session(Identity::admin());
    session
        .execute(create_input(), &mut NullSink)
        .expect("create fixture");
    (arbor, session)
}

pub(crate) fn create_input() -> Command {
    Command::CreateDb {
        input: INPUT.into(),
        name: Some(NAME.into()),
    }
}

/// Registered session with the given permission level.
pub(crate) fn session_with(arbor: &Arbor, permission: Permission) -> Arc<Session> {
    arbor.session(Identity::new(format!("{}-user", permission).to_lowercase(), permission))
}

/// Run a query and collect its output.
pub(crate) fn query(session: &Session, q: &str) -> Vec<String> {
    let mut sink = BufferSink::new();
    session
        .execute(Command::XQuery { query: q.into() }, &mut sink)
        .unwrap_or_else(|e| panic!("query {:?} failed: {}", q, e));
    sink.into_items()
}

/// Size of the database the session has open.
pub(crate) fn size(session: &Session) -> usize {
    session.with_context(|ctx| ctx.database().map(|db| db.size()).unwrap_or(0))
}
