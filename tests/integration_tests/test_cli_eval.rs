// integration tests for the eval command

use std::fs;
use std::path::{Path, PathBuf};

use crate::common::{cleanup_test_dir, create_test_dir, json_result, run_dynif};

fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

const SINGLE_PAGE_ATTRS: &str = r#"{
    "conditions": [
        { "id": "a", "type": "pageType", "values": { "ifPageType": "is_single" } }
    ]
}"#;

#[test]
fn test_eval_visible_on_single_post() {
    let test_dir = create_test_dir("eval_visible");

    let attrs = write_file(&test_dir, "attrs.json", SINGLE_PAGE_ATTRS);
    let ctx = write_file(
        &test_dir,
        "ctx.json",
        r#"{ "page": { "is_single": true } }"#,
    );

    let output = run_dynif(
        &test_dir,
        &[
            "--no-json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(
        output.status.success(),
        "eval failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "visible");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_hidden_off_single_post() {
    let test_dir = create_test_dir("eval_hidden");

    let attrs = write_file(&test_dir, "attrs.json", SINGLE_PAGE_ATTRS);
    let ctx = write_file(
        &test_dir,
        "ctx.json",
        r#"{ "page": { "is_archive": true } }"#,
    );

    let output = run_dynif(
        &test_dir,
        &[
            "--no-json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hidden");

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_exclusion_inverts() {
    let test_dir = create_test_dir("eval_exclusion");

    let attrs = write_file(
        &test_dir,
        "attrs.json",
        r#"{
            "conditions": [
                { "id": "a", "type": "pageType", "values": { "ifPageType": "is_single" } }
            ],
            "exclusion": true
        }"#,
    );
    let ctx = write_file(
        &test_dir,
        "ctx.json",
        r#"{ "page": { "is_single": true } }"#,
    );

    let output = run_dynif(
        &test_dir,
        &[
            "--json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    let result = json_result(&output);
    assert_eq!(result["visible"], false);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_custom_field_and_roles() {
    let test_dir = create_test_dir("eval_custom_field");

    let attrs = write_file(
        &test_dir,
        "attrs.json",
        r#"{
            "conditions": [
                {
                    "id": "cf",
                    "type": "customField",
                    "values": {
                        "customFieldName": "featured",
                        "customFieldRule": "valueEquals",
                        "customFieldValue": "yes"
                    }
                },
                { "id": "role", "type": "userRole", "values": { "userRole": ["editor"] } }
            ]
        }"#,
    );
    let ctx = write_file(
        &test_dir,
        "ctx.json",
        r#"{
            "custom_fields": { "featured": "yes" },
            "user_roles": ["editor"],
            "logged_in": true
        }"#,
    );

    let output = run_dynif(
        &test_dir,
        &[
            "--json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["visible"], true);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_period_with_pinned_clock() {
    let test_dir = create_test_dir("eval_period");

    let attrs = write_file(
        &test_dir,
        "attrs.json",
        r#"{
            "conditions": [
                {
                    "id": "p",
                    "type": "period",
                    "values": {
                        "periodDisplaySetting": "deadline",
                        "periodSpecificationMethod": "direct",
                        "periodDisplayValue": "2026-06-01T00:00"
                    }
                }
            ]
        }"#,
    );

    let ctx = write_file(
        &test_dir,
        "ctx.json",
        r#"{ "now": "2026-05-01T12:00:00" }"#,
    );
    let output = run_dynif(
        &test_dir,
        &[
            "--json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["visible"], true);

    let ctx = write_file(
        &test_dir,
        "ctx2.json",
        r#"{ "now": "2026-07-01T12:00:00" }"#,
    );
    let output = run_dynif(
        &test_dir,
        &[
            "--json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(json_result(&output)["visible"], false);

    cleanup_test_dir(&test_dir);
}

#[test]
fn test_eval_malformed_attrs_exit_code() {
    let test_dir = create_test_dir("eval_malformed");

    let attrs = write_file(&test_dir, "attrs.json", "{broken");
    let ctx = write_file(&test_dir, "ctx.json", "{}");

    let output = run_dynif(
        &test_dir,
        &[
            "--no-json",
            "eval",
            "--attrs",
            attrs.to_str().unwrap(),
            "--context",
            ctx.to_str().unwrap(),
        ],
    );
    assert_eq!(output.status.code(), Some(3));

    cleanup_test_dir(&test_dir);
}
