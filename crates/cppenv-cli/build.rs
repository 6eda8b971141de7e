//! Sets `CPPENV_VERSION` for `cppenv --version`.
//!
//! A `v*` release tag wins. Untagged checkouts report the package version
//! with the commit as build metadata, and builds outside git fall back to
//! the package version alone.

use std::path::Path;
use std::process::Command;

fn main() {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    let git_dir = Path::new(manifest_dir).join("../../.git");
    for watched in ["HEAD", "refs/tags"] {
        println!("cargo:rerun-if-changed={}", git_dir.join(watched).display());
    }

    let package = env!("CARGO_PKG_VERSION");
    let version = match git(&["describe", "--tags", "--match", "v*", "--dirty=-dev"]) {
        Some(tag) => tag.trim_start_matches('v').to_string(),
        None => match git(&["rev-parse", "--short", "HEAD"]) {
            Some(commit) => format!("{package}+g{commit}"),
            None => package.to_string(),
        },
    };

    println!("cargo:rustc-env=CPPENV_VERSION={version}");
}

fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(env!("CARGO_MANIFEST_DIR"))
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}
