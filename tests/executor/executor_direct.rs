//! Executor Dispatch Tests
//!
//! Driving the executor with a caller-owned context, without a session.

use std::thread;

use crate::common::*;
use arbordb::{BufferSink, Command, Context, Error, Identity, NullSink, Options, Permission};

#[test]
fn context_without_session() {
    let arbor = create_arbor();
    let executor = arbor.executor();
    let mut ctx = Context::new(Identity::admin(), Options::default());

    executor
        .execute(
            &mut ctx,
            Command::CreateDb {
                input: "<a><b/></a>".into(),
                name: Some("direct".into()),
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(ctx.database().map(|db| db.name()), Some("direct"));
    assert_eq!(ctx.session(), None);

    // no owning session: every registered session is a target
    let _other = arbor.session(Identity::admin());
    assert_eq!(
        executor
            .execute(&mut ctx, Command::Kill, &mut NullSink)
            .unwrap(),
        "1 sessions killed."
    );
}

#[test]
fn context_identity_is_checked() {
    let arbor = create_arbor();
    let mut ctx = Context::new(Identity::new("guest", Permission::None), Options::default());
    assert!(matches!(
        arbor
            .executor()
            .execute(&mut ctx, Command::List, &mut NullSink),
        Err(Error::PermissionDenied { .. })
    ));
}

#[test]
fn output_channel_feeds_consumer_thread() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    let (mut sink, rx) = arbor.output_channel();
    let consumer = thread::spawn(move || rx.iter().collect::<Vec<_>>());
    session
        .execute(
            Command::XQuery {
                query: "//title".into(),
            },
            &mut sink,
        )
        .unwrap();
    drop(sink);
    assert_eq!(
        consumer.join().unwrap(),
        vec!["<title>Dune</title>", "<title>Solaris</title>"]
    );
}

#[test]
fn list_sees_every_database() {
    let arbor = create_arbor();
    let session = arbor.session(Identity::admin());
    for name in ["c", "a", "b"] {
        session
            .execute(
                Command::CreateDb {
                    input: format!("<{}/>", name),
                    name: Some(name.into()),
                },
                &mut NullSink,
            )
            .unwrap();
    }
    let mut sink = BufferSink::new();
    session.execute(Command::List, &mut sink).unwrap();
    assert_eq!(sink.into_items(), vec!["a\t2", "b\t2", "c\t2"]);
}
