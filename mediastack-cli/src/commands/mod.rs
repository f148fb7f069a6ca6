pub mod bootstrap;

pub use bootstrap::{BootstrapCommands, RunArgs, handle_bootstrap_command};
