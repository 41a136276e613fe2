//! XQuery and Run: output, options and error reporting.

use std::io::Write;
use std::sync::Arc;

use arbor_query::{EvalInput, ItemIter};

use super::*;
use crate::{ArborConfig, BufferSink, Command, Error, Item, NullSink, Plan, QueryEngine, QueryError};

/// Engine whose plans yield one item, fail, then would yield another.
struct FailingEngine;

#[derive(Debug)]
struct FailingPlan;

impl QueryEngine for FailingEngine {
    fn compile(&self, _text: &str) -> arbor_query::Result<Box<dyn Plan>> {
        Ok(Box::new(FailingPlan))
    }
}

impl Plan for FailingPlan {
    fn evaluate<'a>(&'a self, _input: EvalInput<'a>) -> arbor_query::Result<ItemIter<'a>> {
        Ok(Box::new(
            vec![
                Ok(Item::Integer(1)),
                Err(QueryError::Evaluation("division by zero".into())),
                Ok(Item::Integer(3)),
            ]
            .into_iter(),
        ))
    }
}

fn xquery(q: &str) -> Command {
    Command::XQuery { query: q.into() }
}

fn set(option: &str, value: &str) -> Command {
    Command::Set {
        option: option.into(),
        value: value.into(),
    }
}

#[test]
fn test_xquery_without_database() {
    init_tracing();
    let arbor = Arbor::open_default();
    let session = arbor.session(Identity::admin());

    assert!(matches!(
        session.execute(xquery("/"), &mut NullSink),
        Err(Error::Evaluation { .. })
    ));
    assert_eq!(query(&session, "1"), vec!["1"]);
    assert_eq!(query(&session, "'abc'"), vec!["abc"]);

    match session.execute(xquery("1+"), &mut NullSink) {
        Err(Error::Compile { reason }) => assert!(reason.contains("offset"), "{}", reason),
        other => panic!("expected compile error, got {:?}", other),
    }
}

#[test]
fn test_xquery_serializes_nodes() {
    let (_arbor, session) = setup();
    assert_eq!(query(&session, "//li"), vec!["<li>a</li>", "<li>b</li>"]);
    assert_eq!(query(&session, "//title/text()"), vec!["T"]);
    assert_eq!(query(&session, "/html/head"), vec!["<head><title>T</title></head>"]);
    assert!(query(&session, "//missing").is_empty());
}

#[test]
fn test_xquery_info_sentence() {
    let (_arbor, session) = setup();
    let mut sink = BufferSink::new();
    let info = session.execute(xquery("//li"), &mut sink).unwrap();
    assert_eq!(info, "Query executed: 2 item(s).");
    assert_eq!(sink.items().len(), 2);
}

#[test]
fn test_xquery_timings_with_info_on() {
    let (_arbor, session) = setup();
    session.execute(set("info", "on"), &mut NullSink).unwrap();

    let info = session.execute(xquery("//li"), &mut NullSink).unwrap();
    let lines: Vec<&str> = info.lines().collect();
    assert_eq!(lines.len(), 5, "{}", info);
    assert!(lines[0].starts_with("Parsing: "));
    assert!(lines[1].starts_with("Compiling: "));
    assert!(lines[2].starts_with("Evaluating: "));
    assert!(lines[3].starts_with("Total Time: "));
    assert_eq!(lines[4], "Results: 2 item(s)");
}

#[test]
fn test_runs_outputs_last_evaluation_only() {
    let (_arbor, session) = setup();
    session.execute(set("runs", "5"), &mut NullSink).unwrap();
    let mut sink = BufferSink::new();
    let info = session.execute(xquery("//li"), &mut sink).unwrap();
    assert_eq!(info, "Query executed: 2 item(s).");
    assert_eq!(sink.items().len(), 2);
}

#[test]
fn test_xquery_relative_to_selection() {
    let (_arbor, session) = setup();
    session
        .execute(
            Command::Cs {
                query: "//li".into(),
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(query(&session, "."), vec!["<li>a</li>", "<li>b</li>"]);
    assert_eq!(query(&session, ".."), vec!["<ul><li>a</li><li>b</li></ul>"]);
}

#[test]
fn test_xquery_failing_sink_reports_io() {
    let (_arbor, session) = setup();
    let (mut sink, rx) = crate::ChannelSink::new(4);
    drop(rx);
    assert!(matches!(
        session.execute(xquery("//li"), &mut sink),
        Err(Error::Io { .. })
    ));
    // the read lock was released on the error path
    session
        .execute(
            Command::Delete {
                target: "//li".into(),
            },
            &mut NullSink,
        )
        .unwrap();
}

#[test]
fn test_xquery_fails_midway_keeps_written_items() {
    init_tracing();
    let arbor = Arbor::with_engine(ArborConfig::default(), Arc::new(FailingEngine)).unwrap();
    let session = arbor.session(Identity::admin());
    session.execute(create_input(), &mut NullSink).unwrap();

    let mut sink = BufferSink::new();
    let result = session.execute(xquery("anything"), &mut sink);
    assert_eq!(
        result,
        Err(Error::Evaluation {
            reason: "division by zero".into()
        })
    );
    assert_eq!(sink.items(), &["1".to_string()]);

    let flat = session.run(xquery("anything"), &mut NullSink);
    assert!(!flat.success);
    assert_eq!(flat.info, "evaluation error: division by zero");

    // the read lock was dropped with the error, so the writer lock is free
    session
        .execute(Command::DropDb { name: NAME.into() }, &mut NullSink)
        .unwrap();
    assert!(arbor.store().is_empty());
}

#[test]
fn test_run_reads_query_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "// li").unwrap();
    let path = file.path().to_string_lossy().into_owned();
    let run = || Command::Run { path: path.clone() };

    init_tracing();
    let arbor = Arbor::open_default();
    let session = arbor.session(Identity::admin());
    assert!(matches!(
        session.execute(run(), &mut NullSink),
        Err(Error::Evaluation { .. })
    ));

    session.execute(create_input(), &mut NullSink).unwrap();
    let mut sink = BufferSink::new();
    assert_eq!(
        session.execute(run(), &mut sink).unwrap(),
        "Query executed: 2 item(s)."
    );
    assert_eq!(sink.into_items(), vec!["<li>a</li>", "<li>b</li>"]);
}

#[test]
fn test_run_missing_file() {
    let (_arbor, session) = setup();
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.xq");
    let err = session
        .execute(
            Command::Run {
                path: path.to_string_lossy().into_owned(),
            },
            &mut NullSink,
        )
        .unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

#[test]
fn test_create_db_from_file_uses_stem() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("books.xml");
    std::fs::write(&path, "<books><book/><book/></books>").unwrap();

    let (arbor, session) = setup();
    let info = session
        .execute(
            Command::CreateDb {
                input: path.to_string_lossy().into_owned(),
                name: None,
            },
            &mut NullSink,
        )
        .unwrap();
    assert_eq!(info, "Database 'books' created with 4 nodes.");
    assert_eq!(arbor.store().len(), 2);
    assert_eq!(query(&session, "/books/book"), vec!["<book/>", "<book/>"]);
}
