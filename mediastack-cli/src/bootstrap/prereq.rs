//! Prerequisite checker for the media stack
//!
//! The stack only needs a container runtime. It is probed by running
//! `<runtime> --version`; anything other than a clean exit counts as missing.

use anyhow::{Context, Result};
use std::sync::LazyLock;

/// Oldest runtime release known to handle the compose file
pub const MIN_RUNTIME_VERSION: &str = "20.10.0";

static VERSION_RE: LazyLock<regex::Regex> =
    LazyLock::new(|| regex::Regex::new(r"v?(\d+\.\d+\.\d+)").expect("valid version regex"));

/// Result of probing the container runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeCheck {
    pub name: String,
    pub found: bool,
    pub version_output: Option<String>,
    pub installed_version: Option<String>,
    pub meets_requirement: bool,
    pub via_podman: bool,
}

impl RuntimeCheck {
    fn missing(name: &str) -> Self {
        Self {
            name: name.to_string(),
            found: false,
            version_output: None,
            installed_version: None,
            meets_requirement: false,
            via_podman: false,
        }
    }

    /// Build a check from the raw `--version` output of a runtime that exited cleanly
    pub fn from_version_output(name: &str, output: &str) -> Self {
        let installed_version = extract_version(output);
        let via_podman = output.to_lowercase().contains("podman");

        // 🤓 podman versions are not comparable with docker's; accept them
        let meets_requirement = via_podman
            || installed_version
                .as_deref()
                .is_none_or(|v| version_meets_requirement(v, MIN_RUNTIME_VERSION).unwrap_or(false));

        Self {
            name: name.to_string(),
            found: true,
            version_output: Some(output.trim().to_string()),
            installed_version,
            meets_requirement,
            via_podman,
        }
    }

    /// Human label, e.g. "docker (via podman)"
    pub fn display_name(&self) -> String {
        if self.via_podman && self.name != "podman" {
            format!("{} (via podman)", self.name)
        } else {
            self.name.clone()
        }
    }
}

/// Extract semantic version from version output
/// Handles various formats:
///   "Docker version 24.0.7, build afdd53b" -> "24.0.7"
///   "podman version 4.9.3" -> "4.9.3"
fn extract_version(output: &str) -> Option<String> {
    VERSION_RE
        .captures(output)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// Check if installed version is at least the required one
fn version_meets_requirement(installed: &str, minimum: &str) -> Result<bool> {
    let installed_ver = semver::Version::parse(installed.trim())
        .with_context(|| format!("Failed to parse installed version: {installed}"))?;
    let required_ver = semver::Version::parse(minimum.trim())
        .with_context(|| format!("Failed to parse required version: {minimum}"))?;

    Ok(installed_ver >= required_ver)
}

/// Probe the container runtime. Never fails: a missing binary is a result, not an error.
pub fn check_runtime(runtime: &str) -> RuntimeCheck {
    let output = duct::cmd!(runtime, "--version")
        .stdout_capture()
        .stderr_null()
        .unchecked()
        .run();

    match output {
        Ok(out) if out.status.success() => {
            let text = String::from_utf8_lossy(&out.stdout);
            let check = RuntimeCheck::from_version_output(runtime, &text);
            tracing::debug!(?check, "runtime probe");
            check
        }
        Ok(out) => {
            tracing::debug!(runtime, status = ?out.status, "runtime probe exited non-zero");
            RuntimeCheck::missing(runtime)
        }
        Err(e) => {
            tracing::debug!(runtime, "runtime probe failed to spawn: {e}");
            RuntimeCheck::missing(runtime)
        }
    }
}
