//! Stamps `fluxo --version` with the commit it was built from.
//!
//! Packagers building outside a checkout can set `FLUXO_BUILD_SHA` themselves.

use std::env;
use std::path::Path;
use std::process::Command;

const SHA_VAR: &str = "FLUXO_BUILD_SHA";

fn git_short_sha(workspace: &Path) -> Option<String> {
    let out = Command::new("git")
        .arg("-C")
        .arg(workspace)
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()?;
    let sha = String::from_utf8(out.stdout).ok()?.trim().to_string();
    (out.status.success() && !sha.is_empty()).then_some(sha)
}

fn main() {
    println!("cargo:rerun-if-env-changed={SHA_VAR}");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let workspace = Path::new(&manifest_dir).join("..");
    let head = workspace.join(".git").join("HEAD");
    if head.exists() {
        println!("cargo:rerun-if-changed={}", head.display());
    }

    let sha = env::var(SHA_VAR)
        .ok()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| git_short_sha(&workspace))
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env={SHA_VAR}={sha}");
}
