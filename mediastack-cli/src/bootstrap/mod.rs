//! Bootstrap module for the media stack
//!
//! Everything `mediastack run` does before `docker compose up`:
//! - Container runtime prerequisite check
//! - Root path validation
//! - Directory skeleton (service config, media and download dirs)
//! - Timezone detection and host to container path translation
//! - `.env` generation
//! - Run report

pub mod envfile;
pub mod paths;
pub mod prereq;
pub mod report;
pub mod skeleton;
pub mod timezone;
pub mod translate;

pub use envfile::{EnvFileError, EnvFileOutcome, EnvTemplate, write_env_file};
pub use paths::{PathPair, RootKind, ValidationError, normalize_root};
pub use prereq::{RuntimeCheck, check_runtime};
pub use report::{BootstrapReport, print_next_steps, print_summary, write_report};
pub use skeleton::{DirectoryManifest, DirectoryOutcome, SkeletonResult, materialize};
pub use timezone::{Region, TimezoneError, detect_host_timezone, parse_timezone, resolve_timezone};
pub use translate::to_container_path;
