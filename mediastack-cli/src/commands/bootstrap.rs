//! Bootstrap commands for the media stack
//!
//! `run` is the whole pipeline:
//! - Check the container runtime
//! - Acquire the base and media roots
//! - Create the directory skeleton
//! - Generate `.env`
//! - Print the summary and next steps

use crate::bootstrap::report::{print_directory_line, print_runtime_check};
use crate::bootstrap::{
    BootstrapReport, DirectoryManifest, EnvFileOutcome, EnvTemplate, PathPair, RootKind,
    check_runtime, materialize, normalize_root, parse_timezone, print_next_steps, print_summary,
    resolve_timezone, write_env_file, write_report,
};
use crate::prompt::{Prompt, TerminalPrompt};
use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser};
use colored::Colorize;
use std::path::PathBuf;
use std::process::ExitCode;

/// Where the two roots come from when given on the command line
#[derive(Debug, Args, Clone, Default)]
pub struct RootArgs {
    /// Root for per-service config directories (e.g. C:\docker or /srv/docker)
    #[clap(long, env = "MEDIASTACK_BASE_PATH")]
    pub base_path: Option<String>,

    /// Root for media libraries and downloads (e.g. D:\media or /srv/share)
    #[clap(long, env = "MEDIASTACK_MEDIA_PATH")]
    pub media_path: Option<String>,
}

/// Values that go into the generated env file
#[derive(Debug, Args, Clone)]
pub struct EnvArgs {
    /// Timezone written as TZ; detected from the host when omitted
    #[clap(long, env = "MEDIASTACK_TIMEZONE", value_parser = parse_timezone)]
    pub timezone: Option<String>,

    /// User id the containers run as (default 1000)
    #[clap(long)]
    pub puid: Option<u32>,

    /// Group id the containers run as (default 1000)
    #[clap(long)]
    pub pgid: Option<u32>,
}

#[derive(Debug, Parser, Clone)]
pub struct RunArgs {
    #[clap(flatten)]
    pub roots: RootArgs,

    #[clap(flatten)]
    pub env: EnvArgs,

    /// Skip the container runtime check
    #[clap(long)]
    pub skip_prereq_check: bool,

    /// Container runtime binary to probe
    #[clap(long, default_value = "docker", env = "MEDIASTACK_RUNTIME")]
    pub runtime: String,

    /// Path of the generated env file
    #[clap(long, default_value = ".env", env = "MEDIASTACK_ENV_FILE")]
    pub env_file: PathBuf,

    /// Answer yes to every confirmation (continue without runtime, overwrite .env)
    #[clap(short, long)]
    pub yes: bool,

    /// Also write a TOML report of the run to this path
    #[clap(long)]
    pub report: Option<PathBuf>,
}

/// How a `run` ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    /// The runtime was missing and the user chose not to continue
    Cancelled,
}

impl From<RunOutcome> for ExitCode {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            RunOutcome::Completed => ExitCode::SUCCESS,
            RunOutcome::Cancelled => ExitCode::FAILURE,
        }
    }
}

#[derive(Debug, clap::Subcommand, Clone)]
pub enum BootstrapCommands {
    /// Run full setup (check runtime + create directories + generate .env)
    #[clap(alias = "setup")]
    Run(RunArgs),

    /// Check the container runtime only
    Check {
        /// Container runtime binary to probe
        #[clap(long, default_value = "docker", env = "MEDIASTACK_RUNTIME")]
        runtime: String,
    },

    /// Show the directory skeleton, or create it with --create
    Skeleton {
        #[clap(flatten)]
        roots: RootArgs,

        /// Create the directories instead of listing them
        #[clap(long)]
        create: bool,

        /// Print the manifest as JSON
        #[clap(long, conflicts_with = "create")]
        json: bool,
    },

    /// Print the generated env file to stdout without writing it
    Env {
        #[clap(flatten)]
        roots: RootArgs,

        #[clap(flatten)]
        env: EnvArgs,
    },
}

/// Handle bootstrap commands
pub fn handle_bootstrap_command(cmd: BootstrapCommands) -> Result<ExitCode> {
    match cmd {
        BootstrapCommands::Run(args) => {
            let mut prompt = TerminalPrompt::stdio(args.yes);
            run_bootstrap(&args, &mut prompt).map(ExitCode::from)
        }
        BootstrapCommands::Check { runtime } => check_only(&runtime),
        BootstrapCommands::Skeleton {
            roots,
            create,
            json,
        } => {
            let mut prompt = TerminalPrompt::stderr(false);
            skeleton_only(&roots, create, json, &mut prompt)
        }
        BootstrapCommands::Env { roots, env } => {
            // stdout carries the env file itself
            let mut prompt = TerminalPrompt::stderr(false);
            env_only(&roots, &env, &mut prompt)
        }
    }
}

/// Ask until the root validates; a flag value that fails validation is re-asked too
fn acquire_root(kind: RootKind, given: Option<&str>, prompt: &mut dyn Prompt) -> Result<String> {
    if let Some(raw) = given {
        match normalize_root(kind, raw) {
            Ok(path) => return Ok(path),
            Err(e) => prompt.warn(&e.to_string()),
        }
    }

    let question = match kind {
        RootKind::Base => "Base path for container config (e.g. C:\\docker)",
        RootKind::Media => "Media share path for libraries and downloads (e.g. D:\\media)",
    };

    loop {
        let answer = prompt
            .line(question)
            .with_context(|| format!("No {kind} path was entered"))?;
        match normalize_root(kind, &answer) {
            Ok(path) => return Ok(path),
            Err(e) => prompt.warn(&format!("{e}, please try again")),
        }
    }
}

/// Resolve both roots from flags, environment or prompts
pub fn acquire_roots(roots: &RootArgs, prompt: &mut dyn Prompt) -> Result<PathPair> {
    let base_path = acquire_root(RootKind::Base, roots.base_path.as_deref(), prompt)?;
    let media_path = acquire_root(RootKind::Media, roots.media_path.as_deref(), prompt)?;
    Ok(PathPair {
        base_path,
        media_path,
    })
}

fn env_template(roots: &PathPair, env: &EnvArgs) -> EnvTemplate {
    EnvTemplate::new(roots, resolve_timezone(env.timezone.as_deref()))
        .with_identity(env.puid, env.pgid)
}

/// The full pipeline. Only a declined runtime check ends it early.
pub fn run_bootstrap(args: &RunArgs, prompt: &mut dyn Prompt) -> Result<RunOutcome> {
    println!("{}", "🎬 mediastack setup".bold());
    println!();

    let runtime = if args.skip_prereq_check {
        println!("⏭️  Skipping container runtime check");
        None
    } else {
        println!("📋 Checking prerequisites...");
        let check = check_runtime(&args.runtime);
        print_runtime_check(&check);

        if !check.found {
            println!(
                "  {}",
                format!(
                    "{} is required to run the stack. Install Docker Desktop or Docker Engine first.",
                    args.runtime
                )
                .yellow()
            );
            let proceed = prompt
                .confirm("Continue anyway?", false)
                .context("Failed to read answer")?;
            if !proceed {
                println!("{}", "Setup cancelled.".red());
                return Ok(RunOutcome::Cancelled);
            }
        }
        Some(check)
    };

    println!();
    let roots = acquire_roots(&args.roots, prompt)?;
    tracing::info!(base = %roots.base_path, media = %roots.media_path, "roots acquired");

    println!();
    println!("📁 Creating directories...");
    let manifest = DirectoryManifest::for_roots(&roots);
    let skeleton = materialize(&manifest);
    for (path, outcome) in &skeleton.outcomes {
        print_directory_line(path, outcome);
    }

    println!();
    println!("📝 Generating {}...", args.env_file.display());
    let template = env_template(&roots, &args.env);
    println!("  🕐 Timezone: {}", template.tz);
    let env_file = match template.render() {
        Ok(rendered) => write_env_file(&args.env_file, &rendered, prompt),
        Err(e) => EnvFileOutcome::Failed(e.to_string()),
    };
    match &env_file {
        EnvFileOutcome::Written(path) => {
            println!("  {} {}", "✨ Written:".green(), path.display());
        }
        EnvFileOutcome::Skipped => {
            println!("  {} existing file kept", "⏭️ ".yellow());
        }
        EnvFileOutcome::Failed(reason) => {
            println!("  {} {reason}", "❌".red());
        }
    }

    let report = BootstrapReport {
        timestamp: Utc::now().to_rfc3339(),
        runtime,
        timezone: template.tz.clone(),
        roots,
        skeleton,
        env_file,
    };
    print_summary(&report);

    if let Some(path) = &args.report {
        match write_report(&report, path) {
            Ok(written) => println!("📄 Report written to: {}", written.display()),
            Err(e) => println!("  {} {e:#}", "⚠️  Report not written:".yellow()),
        }
    }

    print_next_steps(&args.env_file);
    Ok(RunOutcome::Completed)
}

fn check_only(runtime: &str) -> Result<ExitCode> {
    println!("📋 Checking prerequisites...");
    let check = check_runtime(runtime);
    print_runtime_check(&check);

    if let Some(output) = &check.version_output {
        tracing::info!(%output, "runtime version output");
    }

    Ok(if check.found {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn skeleton_only(
    roots: &RootArgs,
    create: bool,
    json: bool,
    prompt: &mut dyn Prompt,
) -> Result<ExitCode> {
    let roots = acquire_roots(roots, prompt)?;
    let manifest = DirectoryManifest::for_roots(&roots);

    if json {
        let text = serde_json::to_string_pretty(&manifest).context("Failed to serialize manifest")?;
        println!("{text}");
        return Ok(ExitCode::SUCCESS);
    }

    if !create {
        for entry in manifest.entries() {
            println!("  {:<18} {}", entry.label, entry.path.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    println!("📁 Creating directory skeleton...");
    let result = materialize(&manifest);
    for (path, outcome) in &result.outcomes {
        print_directory_line(path, outcome);
    }
    println!(
        "✅ {} created, {} already existed, {} failed",
        result.created(),
        result.already_existed(),
        result.failed()
    );

    Ok(ExitCode::SUCCESS)
}

fn env_only(roots: &RootArgs, env: &EnvArgs, prompt: &mut dyn Prompt) -> Result<ExitCode> {
    let roots = acquire_roots(roots, prompt)?;
    let rendered = env_template(&roots, env)
        .render()
        .context("Failed to render env file")?;
    print!("{rendered}");
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn scripted(answers: &str) -> TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalPrompt::new(Cursor::new(answers.as_bytes().to_vec()), Vec::new(), false)
    }

    fn run_args(dir: &std::path::Path) -> RunArgs {
        RunArgs {
            roots: RootArgs {
                base_path: Some(dir.join("docker").display().to_string()),
                media_path: Some(dir.join("share").display().to_string()),
            },
            env: EnvArgs {
                timezone: Some("America/Denver".to_string()),
                puid: None,
                pgid: None,
            },
            skip_prereq_check: true,
            runtime: "docker".to_string(),
            env_file: dir.join(".env"),
            yes: false,
            report: None,
        }
    }

    #[test]
    fn test_acquire_reprompts_until_non_empty() {
        let mut prompt = scripted("\n   \n/srv/docker/\n/srv/share\n");
        let roots = acquire_roots(&RootArgs::default(), &mut prompt).unwrap();
        assert_eq!(roots.base_path, "/srv/docker");
        assert_eq!(roots.media_path, "/srv/share");
    }

    #[test]
    fn test_acquire_fails_when_input_closes() {
        let mut prompt = scripted("\n");
        let err = acquire_roots(&RootArgs::default(), &mut prompt).unwrap_err();
        assert!(err.to_string().contains("No base path"));
    }

    #[test]
    fn test_invalid_flag_value_falls_back_to_prompt() {
        let roots = RootArgs {
            base_path: Some("  ".to_string()),
            media_path: Some("/srv/share/".to_string()),
        };
        let mut prompt = scripted("/srv/docker\n");
        let pair = acquire_roots(&roots, &mut prompt).unwrap();
        assert_eq!(pair.base_path, "/srv/docker");
        assert_eq!(pair.media_path, "/srv/share");
    }

    #[test]
    fn test_rejections_are_written_to_the_prompt() {
        let mut prompt = scripted("\n/srv/docker\n/srv/share\n");
        acquire_roots(&RootArgs::default(), &mut prompt).unwrap();
        let shown = String::from_utf8_lossy(&prompt.output).into_owned();
        assert!(shown.contains("base path must not be empty, please try again"), "{shown}");
    }

    #[test]
    fn test_declined_runtime_check_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let mut args = run_args(tmp.path());
        args.skip_prereq_check = false;
        args.runtime = "mediastack-missing-runtime".to_string();

        let outcome = run_bootstrap(&args, &mut scripted("n\n")).unwrap();
        assert_eq!(outcome, RunOutcome::Cancelled);
        // Nothing past the check ran
        assert!(!tmp.path().join("docker").exists());
        assert!(!tmp.path().join(".env").exists());
    }

    #[test]
    fn test_full_run_creates_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let args = run_args(tmp.path());

        let outcome = run_bootstrap(&args, &mut scripted("")).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert!(tmp.path().join("docker/plex/config").is_dir());
        assert!(tmp.path().join("share/downloads/incomplete").is_dir());

        let env = std::fs::read_to_string(tmp.path().join(".env")).unwrap();
        assert!(env.contains("TZ=America/Denver\n"));
    }

    #[test]
    fn test_partial_failure_still_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::write(tmp.path().join("share"), b"file, not a dir").unwrap();
        let mut args = run_args(tmp.path());
        args.report = Some(tmp.path().join("report.toml"));

        let outcome = run_bootstrap(&args, &mut scripted("")).unwrap();
        assert_eq!(outcome, RunOutcome::Completed);
        assert!(tmp.path().join(".env").exists());

        let report = std::fs::read_to_string(tmp.path().join("report.toml")).unwrap();
        assert!(report.contains("directories_created = 7"));
        assert!(report.contains("directory_errors = 5"));
    }
}
