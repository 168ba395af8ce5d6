// integration tests for the check command

use std::fs;

use crate::common::{cleanup_test_dir, create_test_dir, json_result, marker, run_dynif};

#[test]
fn test_check_clean_content() {
    let test_dir = create_test_dir("check_clean");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("ok.html"),
        marker(r#"{"conditions":[{"id":"a","type":"pageType","values":{"ifPageType":"is_single"}}]}"#),
    )
    .unwrap();

    let output = run_dynif(
        &test_dir,
        &["--no-json", "check", content_dir.to_str().unwrap()],
    );
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("no warnings"), "{}", stdout);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_suggests_predicate_fix() {
    let test_dir = create_test_dir("check_typo");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("typo.html"),
        marker(r#"{"conditions":[{"id":"a","type":"pageType","values":{"ifPageType":"is_singel"}}]}"#),
    )
    .unwrap();

    let output = run_dynif(
        &test_dir,
        &["--no-json", "check", content_dir.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("did you mean 'is_single'"), "{}", stdout);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_reports_legacy_and_malformed_markers() {
    let test_dir = create_test_dir("check_legacy");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("legacy.html"),
        marker(r#"{"ifPageType":"is_single"}"#),
    )
    .unwrap();
    fs::write(
        content_dir.join("broken.html"),
        marker(r#"{"conditions":,}"#),
    )
    .unwrap();

    let output = run_dynif(
        &test_dir,
        &["--json", "check", content_dir.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(1));

    let result = json_result(&output);
    assert_eq!(result["files"], 2);
    let warnings = result["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 2);
    assert!(warnings
        .iter()
        .any(|w| w["message"].as_str().unwrap().contains("invalid JSON payload")));
    assert!(warnings
        .iter()
        .any(|w| w["message"].as_str().unwrap().contains("pending migration")));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_single_file() {
    let test_dir = create_test_dir("check_single_file");
    let file = test_dir.join("page.html");
    fs::write(&file, marker(r#"{"conditions":[]}"#)).unwrap();

    let output = run_dynif(&test_dir, &["--no-json", "check", file.to_str().unwrap()]);
    assert!(output.status.success());

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_check_missing_path() {
    let test_dir = create_test_dir("check_missing");

    let missing = test_dir.join("nothing-here");
    let output = run_dynif(
        &test_dir,
        &["--no-json", "check", missing.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(2));

    cleanup_test_dir(&test_dir);
}
