//! Error Handling Tests
//!
//! Failed commands report a readable sentence and leave no trace.

use crate::common::*;
use arbordb::{Command, CommandResult, Error, Identity, NullSink};

#[test]
fn failures_flatten_to_info_sentences() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    let cases = [
        (
            Command::Open {
                name: "nowhere".into(),
            },
            "database 'nowhere' was not found",
        ),
        (
            Command::Set {
                option: "runs".into(),
                value: "many".into(),
            },
            "invalid argument: RUNS expects a positive integer, got 'many'",
        ),
        (
            Command::Delete {
                target: "/".into(),
            },
            "invalid argument",
        ),
    ];
    for (cmd, expected) in cases {
        let result = session.run(cmd, &mut NullSink);
        assert!(!result.success);
        assert!(
            result.info.starts_with(expected),
            "{:?} does not start with {:?}",
            result.info,
            expected
        );
    }
}

#[test]
fn compile_errors_carry_offset() {
    let arbor = create_arbor();
    let session = arbor.session(Identity::admin());
    match session.execute(
        Command::XQuery {
            query: "//book[".into(),
        },
        &mut NullSink,
    ) {
        Err(Error::Compile { reason }) => assert!(reason.contains("offset 7"), "{}", reason),
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn failed_update_leaves_content_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());
    let before = items(&session, "/");

    // the comment is not a valid copy target
    let result = session.run(
        Command::Copy {
            source: "//title".into(),
            target: "/library/node()".into(),
            position: None,
        },
        &mut NullSink,
    );
    assert!(!result.success);
    assert_eq!(items(&session, "/"), before);

    let result = session.run(
        Command::Insert {
            kind: "comment".into(),
            target: "//book".into(),
            position: None,
            values: vec!["a -- b".into()],
        },
        &mut NullSink,
    );
    assert!(!result.success);
    assert_eq!(items(&session, "/"), before);
}

#[test]
fn terminated_session_result() {
    let arbor = create_arbor();
    let session = arbor.session(Identity::admin());
    session.disconnect();
    assert_eq!(
        session.run(Command::List, &mut NullSink),
        CommandResult::failed("session terminated")
    );
}
