use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use image_model::{SearchMode, SearchQuery, SkipReason};
use search_service::{search, SearchError, SearchOutcome};

fn write_png(path: &Path, parameters: Option<&str>) {
    let file = File::create(path).expect("fixture file creates");
    let mut encoder = png::Encoder::new(BufWriter::new(file), 1, 1);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    if let Some(text) = parameters {
        encoder
            .add_text_chunk("parameters".to_string(), text.to_string())
            .expect("tEXt chunk accepted");
    }
    let mut writer = encoder.write_header().expect("png header writes");
    writer
        .write_image_data(&[0, 0, 0, 255])
        .expect("pixel data writes");
}

/// a.png "red dress", b.png "blue dress", c.png without metadata.
fn dress_folder() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("a.png"), Some("red dress"));
    write_png(&dir.path().join("b.png"), Some("blue dress"));
    write_png(&dir.path().join("c.png"), None);
    dir
}

fn query(raw: &str, mode: SearchMode) -> SearchQuery {
    SearchQuery::parse(raw, mode).expect("test query has keywords")
}

fn matched_names(outcome: &SearchOutcome) -> Vec<&str> {
    outcome
        .matches
        .iter()
        .map(|record| record.file_name.as_str())
        .collect()
}

#[test]
fn dress_scenario_behaves_per_mode() {
    let dir = dress_folder();

    let and_dress = search(dir.path(), &query("dress", SearchMode::And)).expect("search runs");
    assert_eq!(matched_names(&and_dress), vec!["a.png", "b.png"]);

    let or_colors = search(dir.path(), &query("red, blue", SearchMode::Or)).expect("search runs");
    assert_eq!(matched_names(&or_colors), vec!["a.png", "b.png"]);

    let and_colors = search(dir.path(), &query("red, blue", SearchMode::And)).expect("search runs");
    assert!(and_colors.matches.is_empty());

    for outcome in [&and_dress, &or_colors, &and_colors] {
        assert_eq!(outcome.skipped.len(), 1, "only c.png is skipped");
        assert_eq!(outcome.skipped[0].reason, SkipReason::EmptyMetadata);
        assert!(outcome.skipped[0].path.ends_with("c.png"));
    }
}

#[test]
fn and_results_are_a_subset_of_or_results() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("both.png"), Some("red dress with lace"));
    write_png(&dir.path().join("red.png"), Some("red hat"));
    write_png(&dir.path().join("lace.png"), Some("white lace"));
    write_png(&dir.path().join("none.png"), Some("green coat"));

    let and_outcome = search(dir.path(), &query("red, lace", SearchMode::And)).expect("search runs");
    let or_outcome = search(dir.path(), &query("red, lace", SearchMode::Or)).expect("search runs");

    assert_eq!(matched_names(&and_outcome), vec!["both.png"]);
    assert_eq!(matched_names(&or_outcome), vec!["both.png", "lace.png", "red.png"]);
    for record in &and_outcome.matches {
        assert!(
            or_outcome.matches.iter().any(|m| m.path == record.path),
            "AND match {} must also match under OR",
            record.file_name
        );
    }
}

#[test]
fn empty_metadata_never_matches_in_any_mode() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("silent.png"), None);
    write_png(&dir.path().join("blank.png"), Some(""));

    for mode in [SearchMode::And, SearchMode::Or] {
        let outcome = search(dir.path(), &query("anything", mode)).expect("search runs");
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.skipped.len(), 2);
        assert!(outcome
            .skipped
            .iter()
            .all(|skip| skip.reason == SkipReason::EmptyMetadata));
    }
}

#[test]
fn repeated_search_is_idempotent() {
    let dir = dress_folder();
    let q = query("dress", SearchMode::And);

    let first = search(dir.path(), &q).expect("search runs");
    let second = search(dir.path(), &q).expect("search runs");

    assert_eq!(first.matches, second.matches);
    assert_eq!(first.skipped, second.skipped);
    assert_eq!(first.scanned, second.scanned);
}

#[test]
fn results_come_back_in_file_name_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    // Created out of order on purpose.
    write_png(&dir.path().join("zebra.png"), Some("dress"));
    write_png(&dir.path().join("apple.png"), Some("dress"));
    write_png(&dir.path().join("mango.png"), Some("dress"));

    let outcome = search(dir.path(), &query("dress", SearchMode::And)).expect("search runs");
    assert_eq!(matched_names(&outcome), vec!["apple.png", "mango.png", "zebra.png"]);
}

#[test]
fn non_png_entries_are_skipped_with_their_reason() {
    let dir = dress_folder();
    std::fs::write(dir.path().join("notes.txt"), "red dress everywhere").expect("txt writes");

    let outcome = search(dir.path(), &query("red", SearchMode::Or)).expect("search runs");
    assert_eq!(matched_names(&outcome), vec!["a.png"]);
    assert!(outcome.skipped.iter().any(|skip| {
        skip.path.ends_with("notes.txt") && skip.reason == SkipReason::UnsupportedExtension
    }));
    assert_eq!(outcome.scanned, 4);
}

#[test]
fn undecodable_png_is_skipped_as_a_read_failure() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("good.png"), Some("red dress"));
    std::fs::write(dir.path().join("broken.png"), b"not a png").expect("garbage writes");

    let outcome = search(dir.path(), &query("red", SearchMode::Or)).expect("search runs");
    assert_eq!(matched_names(&outcome), vec!["good.png"]);
    assert_eq!(outcome.skipped.len(), 1);
    match &outcome.skipped[0].reason {
        SkipReason::ReadFailed(message) => {
            assert!(!message.is_empty(), "reason carries the decoder message")
        }
        other => panic!("unexpected skip reason: {other:?}"),
    }
}

#[test]
fn extension_filter_ignores_letter_case() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("SHOUT.PNG"), Some("red dress"));

    let outcome = search(dir.path(), &query("red", SearchMode::And)).expect("search runs");
    assert_eq!(matched_names(&outcome), vec!["SHOUT.PNG"]);
}

#[test]
fn metadata_matching_is_case_insensitive_end_to_end() {
    let dir = tempfile::tempdir().expect("temp dir");
    write_png(&dir.path().join("loud.png"), Some("Red DRESS, Lace trim"));

    let outcome = search(dir.path(), &query(" RED, dress ", SearchMode::And)).expect("search runs");
    assert_eq!(matched_names(&outcome), vec!["loud.png"]);
    assert_eq!(outcome.matches[0].metadata, "red dress, lace trim");
}

#[test]
fn missing_folder_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let missing = dir.path().join("nope");

    let err = search(&missing, &query("red", SearchMode::And)).expect_err("missing folder fails");
    match err {
        SearchError::NotADirectory { path } => assert_eq!(path, missing),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn folder_path_that_is_a_file_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file_path = dir.path().join("really_a_file");
    std::fs::write(&file_path, "flat").expect("file writes");

    let err = search(&file_path, &query("red", SearchMode::And)).expect_err("file path fails");
    match err {
        SearchError::NotADirectory { path } => assert_eq!(path, file_path),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn match_records_carry_enrichment() {
    let dir = dress_folder();

    let outcome = search(dir.path(), &query("red", SearchMode::And)).expect("search runs");
    let record = &outcome.matches[0];
    assert!(record.size_bytes > 0, "fixture png has bytes");
    assert!(record.modified_at.is_some(), "filesystem reports mtime");
}
