//! Configuration Tests
//!
//! Loading `arbor.toml` and how its values reach new sessions.

use arbordb::{Arbor, ArborConfig, Command, Error, NullSink, Permission, CONFIG_FILE_NAME};

#[test]
fn default_file_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    ArborConfig::write_default_if_missing(&path).unwrap();

    let config = ArborConfig::from_file(&path).unwrap();
    assert_eq!(config, ArborConfig::default());
}

#[test]
fn existing_file_is_not_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(&path, "runs = 4\n").unwrap();
    ArborConfig::write_default_if_missing(&path).unwrap();
    assert_eq!(ArborConfig::from_file(&path).unwrap().runs, 4);
}

#[test]
fn file_values_become_session_options() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);
    std::fs::write(
        &path,
        "query_info = true\nchop = false\nruns = 3\ndefault_permission = \"read\"\n",
    )
    .unwrap();

    let arbor = Arbor::from_file(&path).unwrap();
    let session = arbor.connect("guest").unwrap();
    assert_eq!(session.identity().permission, Permission::Read);
    session.with_context(|ctx| {
        assert!(ctx.options().info);
        assert!(!ctx.options().chop);
        assert_eq!(ctx.options().runs, 3);
    });
    assert!(matches!(
        session.execute(
            Command::XQuery {
                query: "1".into()
            },
            &mut NullSink
        ),
        Err(Error::PermissionDenied { .. })
    ));
}

#[test]
fn invalid_files_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(CONFIG_FILE_NAME);

    std::fs::write(&path, "runs = 0\n").unwrap();
    assert!(matches!(Arbor::from_file(&path), Err(Error::Validation { .. })));

    std::fs::write(&path, "default_permission = \"root\"\n").unwrap();
    assert!(matches!(Arbor::from_file(&path), Err(Error::Validation { .. })));

    std::fs::write(&path, "colour = \"blue\"\n").unwrap();
    assert!(matches!(Arbor::from_file(&path), Err(Error::Validation { .. })));

    let missing = dir.path().join("absent.toml");
    assert!(matches!(Arbor::from_file(&missing), Err(Error::Io { .. })));
}
