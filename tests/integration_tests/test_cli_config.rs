// integration tests for the config commands

use std::fs;

use crate::common::{cleanup_test_dir, create_test_dir, run_dynif, run_dynif_with_env};

#[test]
fn test_config_verify_valid() {
    let test_dir = create_test_dir("config_verify_valid");
    let config_path = test_dir.join("config.json");

    fs::write(
        &config_path,
        r#"{
            // json5 comments are fine in config files
            "content": { "extensions": ["html", "txt"] },
        }"#,
    )
    .unwrap();

    let output = run_dynif(&test_dir, &["--no-json", "config", "verify"]);
    assert!(
        output.status.success(),
        "config verify failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("config OK"));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_reports_errors() {
    let test_dir = create_test_dir("config_verify_errors");
    let config_path = test_dir.join("config.json");

    fs::write(
        &config_path,
        r#"{
            "content": { "extensions": [".html"] }
        }"#,
    )
    .unwrap();

    let output = run_dynif(&test_dir, &["--no-json", "config", "verify"]);
    assert_eq!(output.status.code(), Some(5));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("without the leading dot"), "{}", stderr);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_verify_missing_file() {
    let test_dir = create_test_dir("config_verify_missing");

    // DYNIF_CONFIG points at a file that does not exist
    let output = run_dynif(&test_dir, &["--no-json", "config", "verify"]);
    assert_eq!(output.status.code(), Some(5));

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_path_respects_env() {
    let test_dir = create_test_dir("config_path_env");
    let config_path = test_dir.join("config.json");

    let output = run_dynif_with_env(
        &["config", "path"],
        &[("DYNIF_CONFIG", config_path.to_str().unwrap())],
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        config_path.to_str().unwrap()
    );

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_config_show_creates_and_prints_defaults() {
    let test_dir = create_test_dir("config_show_defaults");

    let output = run_dynif(&test_dir, &["config", "show"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let config: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(config["content"]["extensions"][0], "html");

    // first use wrote the default config file
    assert!(test_dir.join("config.json").exists());

    cleanup_test_dir(&test_dir);
}
