use std::process::Command;

fn main() {
    // git metadata is best-effort: release tarballs and vendored checkouts
    // have no .git directory
    let commit = git_output(&["rev-parse", "HEAD"]).unwrap_or_else(|| "unknown".to_string());

    let short_commit = if commit.len() >= 8 {
        commit[..8].to_string()
    } else {
        commit.clone()
    };

    let timestamp = git_output(&["log", "-1", "--format=%ct"]).unwrap_or_else(|| "0".to_string());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .map(|o| !o.stdout.is_empty())
        .unwrap_or(false);

    // set environment variables for compilation
    println!("cargo:rustc-env=GIT_COMMIT={}", commit);
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={}", short_commit);
    println!("cargo:rustc-env=GIT_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=GIT_DIRTY={}", dirty);

    // build date
    let build_date = chrono::Utc::now().to_rfc3339();
    println!("cargo:rustc-env=BUILD_DATE={}", build_date);

    // release channel from environment or default to dev
    let channel = std::env::var("RELEASE_CHANNEL").unwrap_or_else(|_| "dev".to_string());
    println!("cargo:rustc-env=RELEASE_CHANNEL={}", channel);

    // rerun if git HEAD changes
    println!("cargo:rerun-if-changed=.git/HEAD");
}

fn git_output(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let s = String::from_utf8(output.stdout).ok()?.trim().to_string();
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}
