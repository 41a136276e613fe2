//! JSON shape of commands and results, as clients send and receive them.

use serde_json::json;

use crate::{Command, CommandResult, Error, Permission};

fn round_trip(cmd: Command) {
    let json = serde_json::to_string(&cmd).expect("serialize command");
    let restored: Command = serde_json::from_str(&json).expect("deserialize command");
    assert_eq!(cmd, restored, "round trip failed for {}", json);
}

#[test]
fn test_unit_commands_are_strings() {
    assert_eq!(serde_json::to_value(Command::Close).unwrap(), json!("Close"));
    assert_eq!(serde_json::to_value(Command::Kill).unwrap(), json!("Kill"));
    round_trip(Command::List);
    round_trip(Command::InfoDb);
    round_trip(Command::Info);
}

#[test]
fn test_optional_fields_omitted() {
    let cmd = Command::CreateDb {
        input: "input.xml".into(),
        name: None,
    };
    assert_eq!(
        serde_json::to_value(&cmd).unwrap(),
        json!({ "CreateDb": { "input": "input.xml" } })
    );

    let parsed: Command =
        serde_json::from_value(json!({ "Copy": { "source": "//a", "target": "//b" } })).unwrap();
    assert_eq!(
        parsed,
        Command::Copy {
            source: "//a".into(),
            target: "//b".into(),
            position: None,
        }
    );
}

#[test]
fn test_update_commands_round_trip() {
    round_trip(Command::Insert {
        kind: "PI".into(),
        target: "//head".into(),
        position: Some(2),
        values: vec!["style".into(), "href='a.css'".into()],
    });
    round_trip(Command::Update {
        kind: "attribute".into(),
        target: "//@id".into(),
        values: vec!["key".into(), "1".into()],
    });
    round_trip(Command::Delete {
        target: "//li".into(),
    });
}

#[test]
fn test_unknown_fields_rejected() {
    let result: Result<Command, _> =
        serde_json::from_value(json!({ "Open": { "name": "input", "mode": "rw" } }));
    assert!(result.is_err());
}

#[test]
fn test_command_result_shape() {
    let result: CommandResult = Err(Error::PermissionDenied {
        command: "KILL".into(),
        required: Permission::Admin,
    })
    .into();
    assert_eq!(
        serde_json::to_value(&result).unwrap(),
        json!({ "success": false, "info": "permission denied" })
    );
}

#[test]
fn test_error_serializes() {
    let err = Error::Conflict {
        reason: "database 'x' already exists".into(),
    };
    let json = serde_json::to_string(&err).unwrap();
    let restored: Error = serde_json::from_str(&json).unwrap();
    assert_eq!(err, restored);
}
