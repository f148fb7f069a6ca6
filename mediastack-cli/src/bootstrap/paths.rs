//! Root path validation for the media stack
//!
//! Both roots are user input, so they are only trimmed and validated here.
//! Whether they exist is decided later, when the skeleton is created.

use snafu::{Snafu, ensure};

/// Which root a validation error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootKind {
    Base,
    Media,
}

impl RootKind {
    pub fn label(self) -> &'static str {
        match self {
            RootKind::Base => "base",
            RootKind::Media => "media",
        }
    }
}

impl std::fmt::Display for RootKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum ValidationError {
    #[snafu(display("{kind} path must not be empty"))]
    Empty { kind: RootKind },

    #[snafu(display("{kind} path must not contain a line break"))]
    LineBreak { kind: RootKind },
}

/// The two user-supplied roots, normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPair {
    pub base_path: String,
    pub media_path: String,
}

impl PathPair {
    pub fn new(base: &str, media: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            base_path: normalize_root(RootKind::Base, base)?,
            media_path: normalize_root(RootKind::Media, media)?,
        })
    }
}

fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

fn is_drive_designator(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

/// Trim whitespace and trailing separators from a root.
///
/// A root made only of separators keeps its first one, so `/` stays `/`.
/// A drive root keeps one separator too: `C:` alone is drive-relative.
/// Idempotent: normalizing an already normalized root is a no-op.
pub fn normalize_root(kind: RootKind, raw: &str) -> Result<String, ValidationError> {
    let expanded = shellexpand::tilde(raw.trim());
    let trimmed = expanded.trim();

    ensure!(!trimmed.is_empty(), EmptySnafu { kind });
    ensure!(!trimmed.contains(['\n', '\r']), LineBreakSnafu { kind });

    let stripped = trimmed.trim_end_matches(is_separator);
    if stripped.is_empty() {
        // 🤓 all separators: keep the root itself
        return Ok(trimmed[..1].to_string());
    }
    if is_drive_designator(stripped) && trimmed.len() > stripped.len() {
        return Ok(trimmed[..3].to_string());
    }

    Ok(stripped.to_string())
}
