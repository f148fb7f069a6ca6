//! Run report for `mediastack run`
//!
//! Printed to the terminal as colored status lines, and optionally written
//! as a TOML document so a later run (or a human) can see what happened.

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::envfile::EnvFileOutcome;
use super::paths::PathPair;
use super::prereq::RuntimeCheck;
use super::skeleton::{DirectoryOutcome, SkeletonResult};

/// Everything one run produced
#[derive(Debug)]
pub struct BootstrapReport {
    pub timestamp: String,
    pub runtime: Option<RuntimeCheck>,
    pub roots: PathPair,
    pub timezone: String,
    pub skeleton: SkeletonResult,
    pub env_file: EnvFileOutcome,
}

#[derive(Debug, Serialize)]
struct ReportDocument<'a> {
    meta: Meta<'a>,
    summary: Summary,
    #[serde(skip_serializing_if = "Option::is_none")]
    runtime: Option<RuntimeRow<'a>>,
    env_file: EnvFileRow<'a>,
    directories: Vec<DirectoryRow<'a>>,
}

#[derive(Debug, Serialize)]
struct Meta<'a> {
    timestamp: &'a str,
    version: &'static str,
    base_path: &'a str,
    media_path: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Serialize)]
struct Summary {
    directories_processed: usize,
    directories_created: usize,
    directories_existed: usize,
    directory_errors: usize,
}

#[derive(Debug, Serialize)]
struct RuntimeRow<'a> {
    name: &'a str,
    found: bool,
    meets_requirement: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    installed_version: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EnvFileRow<'a> {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DirectoryRow<'a> {
    path: &'a Path,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

fn directory_status(outcome: &DirectoryOutcome) -> (&'static str, Option<&str>) {
    match outcome {
        DirectoryOutcome::Created => ("created", None),
        DirectoryOutcome::AlreadyExisted => ("existed", None),
        DirectoryOutcome::Failed(reason) => ("failed", Some(reason.as_str())),
    }
}

/// Serialize the report to TOML
pub fn serialize_to_toml(report: &BootstrapReport) -> Result<String> {
    let env_file = match &report.env_file {
        EnvFileOutcome::Written(path) => EnvFileRow {
            status: "written",
            path: Some(path.as_path()),
            error: None,
        },
        EnvFileOutcome::Skipped => EnvFileRow {
            status: "skipped",
            path: None,
            error: None,
        },
        EnvFileOutcome::Failed(reason) => EnvFileRow {
            status: "failed",
            path: None,
            error: Some(reason.as_str()),
        },
    };

    let document = ReportDocument {
        meta: Meta {
            timestamp: &report.timestamp,
            version: env!("CARGO_PKG_VERSION"),
            base_path: &report.roots.base_path,
            media_path: &report.roots.media_path,
            timezone: &report.timezone,
        },
        summary: Summary {
            directories_processed: report.skeleton.total_count(),
            directories_created: report.skeleton.created(),
            directories_existed: report.skeleton.already_existed(),
            directory_errors: report.skeleton.failed(),
        },
        runtime: report.runtime.as_ref().map(|check| RuntimeRow {
            name: &check.name,
            found: check.found,
            meets_requirement: check.meets_requirement,
            installed_version: check.installed_version.as_deref(),
        }),
        env_file,
        directories: report
            .skeleton
            .outcomes
            .iter()
            .map(|(path, outcome)| {
                let (status, error) = directory_status(outcome);
                DirectoryRow {
                    path: path.as_path(),
                    status,
                    error,
                }
            })
            .collect(),
    };

    toml::to_string(&document).context("Failed to serialize bootstrap report")
}

/// Write the TOML report, creating the parent directory if needed
pub fn write_report(report: &BootstrapReport, output_path: &Path) -> Result<PathBuf> {
    let content = serialize_to_toml(report)?;

    let expanded = shellexpand::tilde(&output_path.to_string_lossy()).into_owned();
    let final_path = PathBuf::from(expanded);

    if let Some(parent) = final_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create parent directory: {}", parent.display()))?;
    }

    fs::write(&final_path, content)
        .with_context(|| format!("Failed to write report to {}", final_path.display()))?;

    Ok(final_path)
}

/// Print the status line for one directory
pub fn print_directory_line(path: &Path, outcome: &DirectoryOutcome) {
    match outcome {
        DirectoryOutcome::Created => {
            println!("  {} {}", "✨ Created:".green(), path.display());
        }
        DirectoryOutcome::AlreadyExisted => {
            println!("  {} {}", "✅ Exists: ".yellow(), path.display());
        }
        DirectoryOutcome::Failed(reason) => {
            println!("  {} {} ({})", "❌ Failed: ".red(), path.display(), reason);
        }
    }
}

/// Print the runtime probe result
pub fn print_runtime_check(check: &RuntimeCheck) {
    if !check.found {
        println!(
            "  {} {} not found",
            "⚠️ ".yellow(),
            check.name.bold()
        );
        return;
    }

    let version = check.installed_version.as_deref().unwrap_or("unknown");
    if check.meets_requirement {
        println!("  {} {} ({})", "✅".green(), check.display_name(), version);
    } else {
        println!(
            "  {} {} ({}), requires >= {}",
            "⚠️ ".yellow(),
            check.display_name(),
            version,
            super::prereq::MIN_RUNTIME_VERSION
        );
    }
}

/// Print the aggregate summary at the end of a run
pub fn print_summary(report: &BootstrapReport) {
    let skeleton = &report.skeleton;

    println!();
    println!("{}", "📊 Summary".bold());
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("  Directories created: {}", skeleton.created().to_string().green());
    println!(
        "  Already existed:     {}",
        skeleton.already_existed().to_string().yellow()
    );
    if skeleton.failed() > 0 {
        println!("  Failed:              {}", skeleton.failed().to_string().red());
    } else {
        println!("  Failed:              0");
    }
    println!("  Timezone:            {}", report.timezone);

    match &report.env_file {
        EnvFileOutcome::Written(path) => {
            println!("  Env file:            {}", path.display().to_string().green());
        }
        EnvFileOutcome::Skipped => {
            println!("  Env file:            {}", "kept existing".yellow());
        }
        EnvFileOutcome::Failed(reason) => {
            println!("  Env file:            {} ({})", "not written".red(), reason);
        }
    }

    if !skeleton.is_success() {
        println!();
        println!(
            "{}",
            "⚠️  Some directories could not be created. Fix them by hand; the rest of setup is unaffected."
                .yellow()
        );
    }
}

/// Fixed follow-up instructions, printed on every run
pub fn print_next_steps(env_path: &Path) {
    println!();
    println!("{}", "Next steps:".bold());
    println!("  1. Edit {} and replace every CHANGE_ME value", env_path.display());
    println!("     (VPN credentials, Plex claim token from https://plex.tv/claim)");
    println!("  2. Start the stack:        docker compose up -d");
    println!("  3. With Cloudflare tunnel: docker compose --profile tunnel up -d");
    println!("  4. Open Plex at http://localhost:32400/web and the *arr apps on");
    println!("     ports 7878 (Radarr), 8989 (Sonarr), 9696 (Prowlarr), 5055 (Overseerr)");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_report() -> BootstrapReport {
        BootstrapReport {
            timestamp: "2025-11-09T12:00:00Z".to_string(),
            runtime: Some(RuntimeCheck::from_version_output(
                "docker",
                "Docker version 24.0.7, build afdd53b",
            )),
            roots: PathPair::new("/srv/docker", "/srv/share").unwrap(),
            timezone: "America/Denver".to_string(),
            skeleton: SkeletonResult {
                outcomes: vec![
                    (PathBuf::from("/srv/docker/plex/config"), DirectoryOutcome::Created),
                    (PathBuf::from("/srv/docker/gluetun"), DirectoryOutcome::AlreadyExisted),
                    (
                        PathBuf::from("/srv/share/media/tv"),
                        DirectoryOutcome::Failed("permission denied".to_string()),
                    ),
                ],
            },
            env_file: EnvFileOutcome::Skipped,
        }
    }

    #[test]
    fn test_toml_report_contents() {
        let toml = serialize_to_toml(&sample_report()).unwrap();
        assert!(toml.contains("[meta]"));
        assert!(toml.contains("timezone = \"America/Denver\""));
        assert!(toml.contains("directories_created = 1"));
        assert!(toml.contains("directory_errors = 1"));
        assert!(toml.contains("[[directories]]"));
        assert!(toml.contains("error = \"permission denied\""));
        assert!(toml.contains("installed_version = \"24.0.7\""));
    }

    #[test]
    fn test_toml_report_parses_back() {
        let text = serialize_to_toml(&sample_report()).unwrap();
        let value: toml::Table = toml::from_str(&text).unwrap();
        assert_eq!(value["env_file"]["status"].as_str(), Some("skipped"));
        assert_eq!(value["directories"].as_array().map(Vec::len), Some(3));
    }

    #[test]
    fn test_write_report_creates_parent() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("reports").join("run.toml");
        let written = write_report(&sample_report(), &path).unwrap();
        assert_eq!(written, path);
        assert!(fs::read_to_string(&path).unwrap().contains("[summary]"));
    }
}
