//! Workflow Tests
//!
//! Realistic command sequences across several sessions.

use crate::common::*;
use arbordb::{BufferSink, Command, Identity, NullSink, Permission};

#[test]
fn create_query_update_drop() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    assert_eq!(items(&session, "//title/text()"), vec!["Dune", "Solaris"]);
    assert_eq!(items(&session, "//book/@id"), vec![r#"id="1""#, r#"id="2""#]);
    assert_eq!(items(&session, "//comment()"), vec!["<!-- shelved -->"]);

    session
        .execute(
            Command::Insert {
                kind: "fragment".into(),
                target: "/library".into(),
                position: None,
                values: vec![r#"<book id="3"><title>Ubik</title></book>"#.into()],
            },
            &mut NullSink,
        )
        .unwrap();
    session
        .execute(
            Command::Update {
                kind: "text".into(),
                target: "//book[3]/title/text()".into(),
                values: vec!["Ubik!".into()],
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(
        items(&session, "//title/text()"),
        vec!["Dune", "Solaris", "Ubik!"]
    );

    let mut sink = BufferSink::new();
    session.execute(Command::InfoDb, &mut sink).unwrap();
    assert!(sink.items().contains(&"Updates: 2".to_string()));

    session
        .execute(
            Command::DropDb {
                name: "library".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    assert!(arbor.store().is_empty());
}

#[test]
fn selection_narrows_updates() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    session
        .execute(
            Command::Cs {
                query: "//book[2]".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    session
        .execute(
            Command::Insert {
                kind: "attribute".into(),
                target: ".".into(),
                position: None,
                values: vec!["lang".into(), "pl".into()],
            },
            &mut NullSink,
        )
        .unwrap();
    session
        .execute(
            Command::Cs {
                query: "/".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(items(&session, "//@lang"), vec![r#"lang="pl""#]);
}

#[test]
fn copy_between_books() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    session
        .execute(
            Command::Copy {
                source: "//book[1]/author".into(),
                target: "//book[2]".into(),
                position: Some(1),
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(
        items(&session, "//book[2]/*[1]"),
        vec!["<author>Herbert</author>"]
    );
}

#[test]
fn reader_and_writer_share_content() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let owner = create_library(&arbor, dir.path());
    let reader = arbor.session(Identity::new("reader", Permission::Read));

    reader
        .execute(
            Command::Open {
                name: "library".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    owner
        .execute(
            Command::Delete {
                target: "//book[1]".into(),
            },
            &mut NullSink,
        )
        .unwrap();

    let mut sink = BufferSink::new();
    let info = reader.execute(Command::InfoDb, &mut sink).unwrap();
    assert_eq!(info, "Database 'library' has 9 nodes.");
    assert!(sink.items().contains(&"Sessions: 2".to_string()));
}

#[test]
fn run_query_file() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let session = create_library(&arbor, dir.path());

    let query = dir.path().join("authors.xq");
    std::fs::write(&query, "//author/text()\n").unwrap();

    let mut sink = BufferSink::new();
    let info = session
        .execute(
            Command::Run {
                path: query.to_string_lossy().into_owned(),
            },
            &mut sink,
        )
        .unwrap();
    assert_eq!(info, "Query executed: 2 item(s).");
    assert_eq!(sink.into_items(), vec!["Herbert", "Lem"]);
}

#[test]
fn admin_kill_then_shutdown() {
    let dir = tempfile::tempdir().unwrap();
    let arbor = create_arbor();
    let admin = create_library(&arbor, dir.path());
    let users: Vec<_> = (0..3)
        .map(|i| arbor.connect(&format!("user{}", i)).unwrap())
        .collect();

    assert_eq!(
        admin.execute(Command::Kill, &mut NullSink).unwrap(),
        "4 sessions killed."
    );
    assert!(users.iter().all(|u| !u.is_active()));
    assert!(!admin.is_active());
    assert!(arbor.registry().is_empty());
    assert_eq!(arbor.shutdown(), 0);
}
