//! Common test utilities for executor tests

use std::path::Path;
use std::sync::Arc;

use arbordb::{Arbor, ArborConfig, BufferSink, Command, Identity, NullSink, Session};

pub const BOOKS: &str = r#"<library>
  <book id="1"><title>Dune</title><author>Herbert</author></book>
  <book id="2"><title>Solaris</title><author>Lem</author></book>
  <!-- shelved -->
</library>"#;

/// Create a server instance with the default configuration
pub fn create_arbor() -> Arbor {
    Arbor::open(ArborConfig::default()).unwrap()
}

/// Create an admin session with `library` created from a file in `dir`
pub fn create_library(arbor: &Arbor, dir: &Path) -> Arc<Session> {
    let path = dir.join("library.xml");
    std::fs::write(&path, BOOKS).unwrap();
    let session = arbor.session(Identity::admin());
    session
        .execute(
            Command::CreateDb {
                input: path.to_string_lossy().into_owned(),
                name: None,
            },
            &mut NullSink,
        )
        .unwrap();
    session
}

/// Run a query and return its serialized items
pub fn items(session: &Session, query: &str) -> Vec<String> {
    let mut sink = BufferSink::new();
    session
        .execute(
            Command::XQuery {
                query: query.into(),
            },
            &mut sink,
        )
        .unwrap();
    sink.into_items()
}
