//! Build script for ahan-hub
//!
//! Stamps the binary with `GIT_HASH`, `BUILD_TIMESTAMP` and `BUILD_PROFILE`
//! for the startup log line. Packagers can pin the first two with
//! `AHAN_GIT_HASH` / `AHAN_BUILD_TIMESTAMP` for reproducible builds.
//!
//! Reruns when the bundled seed dataset or the checked-out commit changes.

use std::env;
use std::process::Command;

fn git_hash() -> Option<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--short=8", "HEAD"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let hash = String::from_utf8(output.stdout).ok()?;
    Some(hash.trim().to_string()).filter(|h| !h.is_empty())
}

fn main() {
    println!("cargo:rerun-if-changed=data/defaults.json");
    println!("cargo:rerun-if-changed=../.git/HEAD");
    println!("cargo:rerun-if-changed=../.git/refs");
    println!("cargo:rerun-if-env-changed=AHAN_GIT_HASH");
    println!("cargo:rerun-if-env-changed=AHAN_BUILD_TIMESTAMP");

    let hash = env::var("AHAN_GIT_HASH")
        .ok()
        .or_else(git_hash)
        .unwrap_or_else(|| "unknown".to_string());

    let timestamp = env::var("AHAN_BUILD_TIMESTAMP").unwrap_or_else(|_| {
        chrono::Local::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, false)
    });

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", hash);
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);
}
