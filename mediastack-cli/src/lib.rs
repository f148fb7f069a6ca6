//! mediastack - prepares a host for the mediastack docker compose stack
//!
//! Creates the service config, media and download directories and writes
//! the `.env` file the compose manifest reads.

pub mod bootstrap;
pub mod commands;
pub mod prompt;
