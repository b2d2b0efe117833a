use std::process::Command;

/// Set by packagers building `tripmerge` from a tarball without `.git`.
const COMMIT_OVERRIDE: &str = "TRIPMERGE_BUILD_COMMIT";

fn main() {
    // `tripmerge --version` names the commit the binary was built from.
    println!("cargo:rerun-if-changed=../../.git/HEAD");
    println!("cargo:rerun-if-changed=../../.git/refs/heads");
    println!("cargo:rerun-if-env-changed={COMMIT_OVERRIDE}");

    let commit = std::env::var(COMMIT_OVERRIDE)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(short_head)
        .unwrap_or_else(|| "unknown".to_string());
    println!("cargo:rustc-env=GIT_COMMIT_HASH={}", commit.trim());

    // The `target:` line of the long version.
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=TARGET={target}");
}

fn short_head() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout).ok().map(|s| s.trim().to_string())
}
