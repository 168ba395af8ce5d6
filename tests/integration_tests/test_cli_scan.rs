// integration tests for the scan command and its completed-flag gating

use std::fs;

use crate::common::{cleanup_test_dir, create_test_dir, json_result, marker, run_dynif};

#[test]
fn test_scan_lists_pending_then_clears_after_migrate() {
    let test_dir = create_test_dir("scan_lists_pending");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("legacy.html"),
        marker(r#"{"ifPageType":"is_single"}"#),
    )
    .unwrap();
    fs::write(
        content_dir.join("new.html"),
        marker(r#"{"conditions":[]}"#),
    )
    .unwrap();

    let output = run_dynif(&test_dir, &["--json", "scan", content_dir.to_str().unwrap()]);
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["pending"], serde_json::json!(["legacy.html"]));
    assert_eq!(result["done"], false);

    let output = run_dynif(
        &test_dir,
        &["--json", "migrate", content_dir.to_str().unwrap()],
    );
    assert!(output.status.success());

    let output = run_dynif(&test_dir, &["--json", "scan", content_dir.to_str().unwrap()]);
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["pending"], serde_json::json!([]));
    assert_eq!(result["done"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_scan_flag_short_circuits_until_reset() {
    let test_dir = create_test_dir("scan_flag_gating");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    // first scan over an empty root sets the completed flag
    let output = run_dynif(&test_dir, &["--json", "scan", content_dir.to_str().unwrap()]);
    assert!(output.status.success());
    assert_eq!(json_result(&output)["done"], true);

    // new legacy content appears after the flag was set
    fs::write(
        content_dir.join("late.html"),
        marker(r#"{"userRole":["editor"]}"#),
    )
    .unwrap();

    // the flag wins: the scan short-circuits without looking
    let output = run_dynif(&test_dir, &["--json", "scan", content_dir.to_str().unwrap()]);
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["pending"], serde_json::json!([]));

    // an explicit reset (the upgrade path) re-scans and finds it
    let output = run_dynif(
        &test_dir,
        &["--json", "scan", content_dir.to_str().unwrap(), "--reset"],
    );
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["pending"], serde_json::json!(["late.html"]));
    assert_eq!(result["done"], false);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_scan_text_output() {
    let test_dir = create_test_dir("scan_text");
    let content_dir = test_dir.join("content");
    fs::create_dir_all(&content_dir).unwrap();

    fs::write(
        content_dir.join("legacy.html"),
        marker(r#"{"showOnlyLoginUser":true}"#),
    )
    .unwrap();

    let output = run_dynif(
        &test_dir,
        &["--no-json", "scan", content_dir.to_str().unwrap()],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("legacy.html"));

    let output = run_dynif(
        &test_dir,
        &["--no-json", "migrate", content_dir.to_str().unwrap()],
    );
    assert!(output.status.success());

    let output = run_dynif(
        &test_dir,
        &["--no-json", "scan", content_dir.to_str().unwrap()],
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("migration complete"));

    cleanup_test_dir(&test_dir);
}
