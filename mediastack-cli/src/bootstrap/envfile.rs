//! `.env` generation for docker compose
//!
//! Rendering is a pure function of [`EnvTemplate`]; writing is separate so
//! the overwrite question can be asked without touching the renderer.

use serde::Serialize;
use snafu::{ResultExt, Snafu};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::prompt::Prompt;

use super::paths::PathPair;
use super::translate::to_container_path;

const ENV_TEMPLATE: &str = include_str!("../../templates/env.tera");

/// Identity linuxserver.io images run as unless told otherwise
pub const DEFAULT_PUID: u32 = 1000;
pub const DEFAULT_PGID: u32 = 1000;

#[derive(Debug, Snafu)]
pub enum EnvFileError {
    #[snafu(display("Failed to render env template"))]
    Render { source: tera::Error },

    #[snafu(display("Failed to create temporary file in {}", dir.display()))]
    CreateTemp { dir: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to write {}", path.display()))]
    Write { path: PathBuf, source: std::io::Error },

    #[snafu(display("Failed to move env file into place at {}", path.display()))]
    Persist {
        path: PathBuf,
        source: tempfile::PersistError,
    },
}

/// Values substituted into the env template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvTemplate {
    pub version: String,
    pub puid: u32,
    pub pgid: u32,
    pub tz: String,
    pub base_path: String,
    pub media_share: String,
    pub vpn_provider: String,
    pub vpn_user: String,
    pub vpn_password: String,
    pub vpn_countries: String,
    pub plex_claim: String,
    pub tunnel_token: String,
}

impl EnvTemplate {
    /// Template for the given roots, with credentials left as placeholders
    pub fn new(roots: &PathPair, tz: impl Into<String>) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            puid: DEFAULT_PUID,
            pgid: DEFAULT_PGID,
            tz: tz.into(),
            base_path: to_container_path(&roots.base_path),
            media_share: to_container_path(&roots.media_path),
            vpn_provider: "CHANGE_ME_provider".to_string(),
            vpn_user: "CHANGE_ME_vpn_username".to_string(),
            vpn_password: "CHANGE_ME_vpn_password".to_string(),
            vpn_countries: "United States".to_string(),
            plex_claim: "claim-CHANGE_ME".to_string(),
            tunnel_token: "CHANGE_ME_tunnel_token".to_string(),
        }
    }

    pub fn with_identity(mut self, puid: Option<u32>, pgid: Option<u32>) -> Self {
        self.puid = puid.unwrap_or(self.puid);
        self.pgid = pgid.unwrap_or(self.pgid);
        self
    }

    /// Render the flat `KEY=VALUE` text. Values are written verbatim.
    pub fn render(&self) -> Result<String, EnvFileError> {
        let context = tera::Context::from_serialize(self).context(RenderSnafu)?;
        tera::Tera::one_off(ENV_TEMPLATE, &context, false).context(RenderSnafu)
    }
}

/// What happened to the env file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvFileOutcome {
    Written(PathBuf),
    Skipped,
    Failed(String),
}

/// Write `contents` to `path` in one step: temp file in the same directory, then rename
fn write_atomic(path: &Path, contents: &str) -> Result<(), EnvFileError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(&dir).context(CreateTempSnafu { dir })?;
    tmp.write_all(contents.as_bytes())
        .and_then(|()| tmp.as_file().sync_all())
        .context(WriteSnafu { path })?;

    // The temp file is created 0600; an overwrite keeps the old mode
    if let Ok(existing) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(existing.permissions())
            .context(WriteSnafu { path })?;
    }

    tmp.persist(path).context(PersistSnafu { path })?;
    Ok(())
}

/// Write the env file, asking before replacing an existing one
pub fn write_env_file(path: &Path, contents: &str, prompt: &mut dyn Prompt) -> EnvFileOutcome {
    if path.exists() {
        let question = format!("{} already exists. Overwrite?", path.display());
        match prompt.confirm(&question, false) {
            Ok(true) => {}
            Ok(false) => {
                tracing::info!(path = %path.display(), "keeping existing env file");
                return EnvFileOutcome::Skipped;
            }
            Err(e) => {
                return EnvFileOutcome::Failed(format!("Failed to read overwrite answer: {e}"));
            }
        }
    }

    match write_atomic(path, contents) {
        Ok(()) => EnvFileOutcome::Written(path.to_path_buf()),
        Err(e) => {
            let reason = match std::error::Error::source(&e) {
                Some(source) => format!("{e}: {source}"),
                None => e.to_string(),
            };
            tracing::warn!(path = %path.display(), "{reason}");
            EnvFileOutcome::Failed(reason)
        }
    }
}
