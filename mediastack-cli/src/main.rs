use clap::{ArgAction, Parser};
use colored::Colorize;
use mediastack_cli::commands::{BootstrapCommands, RunArgs, handle_bootstrap_command};
use std::process::ExitCode;

#[derive(Parser)]
#[clap(name = "mediastack", version, about = "Set up directories and .env for the mediastack compose stack")]
struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG overrides
    #[clap(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// Defaults to `run` when omitted
    #[clap(subcommand)]
    command: Option<BootstrapCommands>,
}

fn default_filter(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    }
}

fn init_logging(verbose: u8) {
    let env = env_logger::Env::default().default_filter_or(default_filter(verbose));
    env_logger::Builder::from_env(env)
        .format_timestamp(None)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    // 🤓 bare `mediastack` is an interactive `run`; env vars still apply
    let command = cli
        .command
        .unwrap_or_else(|| BootstrapCommands::Run(RunArgs::parse_from(["mediastack"])));

    match handle_bootstrap_command(command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "Error:".red());
            ExitCode::FAILURE
        }
    }
}
