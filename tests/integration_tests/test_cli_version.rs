// integration tests for the version command

use crate::common::{cleanup_test_dir, create_test_dir, json_result, run_dynif};

#[test]
fn test_version_text_output() {
    let test_dir = create_test_dir("version_text");

    let output = run_dynif(&test_dir, &["--no-json", "version"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.starts_with("dynif "), "{}", stdout);
    assert!(stdout.contains("built"), "{}", stdout);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_version_json_output() {
    let test_dir = create_test_dir("version_json");

    let output = run_dynif(&test_dir, &["--json", "version"]);
    assert!(output.status.success());

    let result = json_result(&output);
    assert_eq!(result["action"], "version");
    assert!(result["version"].as_str().is_some());
    assert!(result["channel"].as_str().is_some());

    cleanup_test_dir(&test_dir);
}
