use std::path::Path;

use image_model::FileAction;
use search_service::{apply_file_action, ActionError, ActionOutcome};

fn write_sample(path: &Path) {
    std::fs::write(path, b"png bytes stand-in").expect("sample file writes");
}

#[test]
fn copy_lands_in_destination_and_keeps_the_source() {
    let src_dir = tempfile::tempdir().expect("source dir");
    let dest_dir = tempfile::tempdir().expect("dest dir");
    let source = src_dir.path().join("shot.png");
    write_sample(&source);

    let outcome = apply_file_action(&FileAction::Copy {
        source: source.clone(),
        dest_dir: dest_dir.path().to_path_buf(),
    })
    .expect("copy succeeds");

    let expected_dest = dest_dir.path().join("shot.png");
    assert_eq!(outcome, ActionOutcome::Copied { dest: expected_dest.clone() });
    assert!(source.exists(), "copy must keep the source");
    let copied = std::fs::read(&expected_dest).expect("destination file exists");
    assert_eq!(copied, b"png bytes stand-in");
}

#[test]
fn move_removes_the_source() {
    let src_dir = tempfile::tempdir().expect("source dir");
    let dest_dir = tempfile::tempdir().expect("dest dir");
    let source = src_dir.path().join("shot.png");
    write_sample(&source);

    let outcome = apply_file_action(&FileAction::Move {
        source: source.clone(),
        dest_dir: dest_dir.path().to_path_buf(),
    })
    .expect("move succeeds");

    let expected_dest = dest_dir.path().join("shot.png");
    assert_eq!(outcome, ActionOutcome::Moved { dest: expected_dest.clone() });
    assert!(!source.exists(), "move must remove the source");
    assert!(expected_dest.exists());
}

#[test]
fn copy_into_missing_directory_fails() {
    let src_dir = tempfile::tempdir().expect("source dir");
    let source = src_dir.path().join("shot.png");
    write_sample(&source);
    let missing = src_dir.path().join("not_there");

    let err = apply_file_action(&FileAction::Copy {
        source,
        dest_dir: missing.clone(),
    })
    .expect_err("missing destination fails");

    match err {
        ActionError::NotADirectory { path } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn move_of_missing_source_fails() {
    let dest_dir = tempfile::tempdir().expect("dest dir");
    let source = dest_dir.path().join("ghost.png");

    let err = apply_file_action(&FileAction::Move {
        source: source.clone(),
        dest_dir: dest_dir.path().to_path_buf(),
    })
    .expect_err("missing source fails");

    match err {
        ActionError::MissingSource { path } => assert_eq!(path, source),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn open_of_missing_path_fails_without_reaching_the_os() {
    let dir = tempfile::tempdir().expect("temp dir");
    let ghost = dir.path().join("ghost.png");

    let err = apply_file_action(&FileAction::OpenExternal { path: ghost.clone() })
        .expect_err("missing path fails");
    match err {
        ActionError::MissingSource { path } => assert_eq!(path, ghost),
        other => panic!("unexpected error: {other:?}"),
    }
}
