// shared utilities for integration tests

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// get path to the built dynif binary (provided by cargo for integration tests)
pub fn dynif_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_dynif"))
}

/// create a temporary directory for test fixtures
pub fn create_test_dir(name: &str) -> PathBuf {
    let base = env::temp_dir().join("dynif_integration_tests");
    let dir = base.join(name);

    // clean up if exists
    if dir.exists() {
        fs::remove_dir_all(&dir).ok();
    }

    fs::create_dir_all(&dir).expect("Failed to create test directory");
    dir
}

/// clean up a test directory
pub fn cleanup_test_dir(path: &Path) {
    if path.exists() {
        fs::remove_dir_all(path).ok();
    }
}

/// run dynif with a config file isolated inside the test directory
pub fn run_dynif(test_dir: &Path, args: &[&str]) -> Output {
    run_dynif_with_env(
        args,
        &[(
            "DYNIF_CONFIG",
            test_dir.join("config.json").to_str().unwrap(),
        )],
    )
}

/// run dynif with custom environment
pub fn run_dynif_with_env(args: &[&str], env_vars: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(dynif_binary_path());
    cmd.args(args);

    for (key, value) in env_vars {
        cmd.env(key, value);
    }

    cmd.output().expect("Failed to run dynif")
}

/// a marker carrying the given payload
pub fn marker(payload: &str) -> String {
    format!("<!-- block:dynif/conditional {} -->", payload)
}

/// parse a JSON-RPC success envelope from stdout and return the result
pub fn json_result(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let envelope: serde_json::Value = serde_json::from_str(stdout.trim())
        .unwrap_or_else(|e| panic!("invalid JSON output: {} in {:?}", e, stdout));
    assert_eq!(envelope["jsonrpc"], "2.0", "not a JSON-RPC envelope");
    envelope["result"].clone()
}
