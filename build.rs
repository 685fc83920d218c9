// SPDX-License-Identifier: GPL-3.0-only

use std::process::Command;

fn main() {
    println!("cargo::rerun-if-changed=.git/HEAD");
    println!("cargo::rerun-if-changed=.git/refs/tags");
    println!("cargo::rerun-if-changed=i18n");

    // Packagers may pin the version string instead of relying on git
    let version = match std::env::var("QRREADER_VERSION") {
        Ok(v) => v,
        Err(_) => git_version().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string()),
    };

    println!("cargo::rustc-env=GIT_VERSION={}", version);
}

/// `git describe` output without the leading `v`, e.g. `0.1.0` or
/// `0.1.0-3-gabcdef1`. Falls back to the short commit hash when no tag exists.
fn git_version() -> Option<String> {
    let describe = Command::new("git")
        .args(["describe", "--tags", "--always", "--match", "v*"])
        .output()
        .ok()?;

    if !describe.status.success() {
        return None;
    }

    let raw = String::from_utf8_lossy(&describe.stdout).trim().to_string();
    if raw.is_empty() {
        return None;
    }

    Some(raw.strip_prefix('v').unwrap_or(&raw).to_string())
}
