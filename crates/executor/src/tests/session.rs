//! Session tests: lifecycle, context isolation and release of resources.

use super::*;
use crate::{Command, CommandResult, Error, NullSink, SessionState};

#[test]
fn test_new_session_is_active_with_empty_context() {
    init_tracing();
    let arbor = Arbor::open_default();
    let session = arbor.session(Identity::admin());

    assert_eq!(session.state(), SessionState::Active);
    session.with_context(|ctx| {
        assert!(ctx.database().is_none());
        assert!(ctx.selection().is_empty());
        assert_eq!(ctx.session(), Some(session.id()));
        assert_eq!(ctx.identity(), &Identity::admin());
    });
}

#[test]
fn test_contexts_are_isolated() {
    let (arbor, first) = setup();
    let second = arbor.session(Identity::admin());

    second
        .execute(Command::Open { name: NAME.into() }, &mut NullSink)
        .unwrap();
    second
        .execute(
            Command::Set {
                option: "runs".into(),
                value: "2".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    second
        .execute(
            Command::Cs {
                query: "//li".into(),
            },
            &mut NullSink,
        )
        .unwrap();

    first.with_context(|ctx| {
        assert_eq!(ctx.options().runs, 1);
        assert_eq!(ctx.selection().len(), 1);
    });

    // content is shared
    first
        .execute(
            Command::Delete {
                target: "//title".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(size(&second), INPUT_SIZE - 2);
}

#[test]
fn test_terminate_releases_database() {
    let (arbor, session) = setup();
    let db = session.with_context(|ctx| ctx.database().cloned()).unwrap();
    assert_eq!(db.pins(), 1);

    assert!(session.terminate());
    assert_eq!(db.pins(), 0);
    session.with_context(|ctx| assert!(ctx.database().is_none()));

    // nothing holds it any more
    let admin = arbor.session(Identity::admin());
    admin
        .execute(Command::DropDb { name: NAME.into() }, &mut NullSink)
        .unwrap();
}

#[test]
fn test_terminated_session_keeps_failing() {
    let (_arbor, session) = setup();
    session.terminate();
    for cmd in [Command::List, Command::Close, Command::Kill] {
        assert_eq!(session.execute(cmd, &mut NullSink), Err(Error::Terminated));
    }
    assert_eq!(
        session.run(Command::Info, &mut NullSink),
        CommandResult::failed("session terminated")
    );
}

#[test]
fn test_run_flattens_result() {
    let (_arbor, session) = setup();
    let ok = session.run(Command::Close, &mut NullSink);
    assert!(ok.success);
    assert_eq!(ok.info, "Database 'input' closed.");

    let failed = session.run(Command::InfoDb, &mut NullSink);
    assert!(!failed.success);
    assert_eq!(failed.info, "no database opened");
}

#[test]
fn test_failed_command_leaves_session_usable() {
    let (_arbor, session) = setup();
    assert!(session
        .execute(Command::Open { name: "nope".into() }, &mut NullSink)
        .is_err());
    assert!(session.is_active());
    assert_eq!(query(&session, "//title/text()"), vec!["T"]);
}

#[test]
fn test_disconnect_deregisters() {
    let (arbor, session) = setup();
    assert_eq!(arbor.registry().len(), 1);
    session.disconnect();
    assert!(arbor.registry().is_empty());
    assert!(!session.is_active());
}

#[test]
fn test_connect_uses_default_permission() {
    init_tracing();
    let arbor = Arbor::open_default();
    let session = arbor.connect("alice").unwrap();
    assert_eq!(session.identity().user, "alice");
    assert_eq!(session.identity().permission, Permission::Standard);
    assert!(matches!(
        session.execute(Command::Kill, &mut NullSink),
        Err(Error::PermissionDenied { .. })
    ));
}

#[test]
fn test_shutdown_terminates_everyone() {
    let (arbor, first) = setup();
    let second = arbor.session(Identity::admin());
    assert_eq!(arbor.shutdown(), 2);
    assert!(!first.is_active());
    assert!(!second.is_active());
    assert_eq!(arbor.shutdown(), 0);
}

#[test]
fn test_dropping_instance_terminates_sessions() {
    let (arbor, session) = setup();
    drop(arbor);
    assert_eq!(session.state(), SessionState::Terminated);
}
