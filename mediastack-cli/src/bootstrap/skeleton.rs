//! Skeleton generator for the media stack directory layout
//!
//! Builds the fixed manifest of config, media and download directories
//! and creates whatever is missing. A failing entry never stops the rest.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::paths::PathPair;

/// Config directories under the base root, one per managed service
const BASE_LAYOUT: &[(&str, &[&str])] = &[
    ("plex", &["plex", "config"]),
    ("radarr", &["radarr", "config"]),
    ("sonarr", &["sonarr", "config"]),
    ("prowlarr", &["prowlarr", "config"]),
    ("overseerr", &["overseerr", "config"]),
    ("qbittorrent", &["qbittorrent", "config"]),
    // VPN sidecar keeps its state in a bare directory
    ("gluetun", &["gluetun"]),
];

/// Library and download directories under the media root
const MEDIA_LAYOUT: &[(&str, &[&str])] = &[
    ("movies", &["media", "movies"]),
    ("tv", &["media", "tv"]),
    ("downloads-movies", &["downloads", "movies"]),
    ("downloads-tv", &["downloads", "tv"]),
    ("incomplete", &["downloads", "incomplete"]),
];

/// A single directory the stack expects to exist
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    pub label: &'static str,
    pub path: PathBuf,
}

/// Ordered, duplicate-free list of directories for a pair of roots
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryManifest {
    entries: Vec<ManifestEntry>,
}

impl DirectoryManifest {
    /// Total number of entries every manifest has
    pub const LEN: usize = BASE_LAYOUT.len() + MEDIA_LAYOUT.len();

    /// Resolve the fixed layout against the given roots.
    ///
    /// Pure: does not touch the filesystem.
    pub fn for_roots(roots: &PathPair) -> Self {
        let base = Path::new(&roots.base_path);
        let media = Path::new(&roots.media_path);

        let entries = BASE_LAYOUT
            .iter()
            .map(|(label, segments)| (base, *label, *segments))
            .chain(
                MEDIA_LAYOUT
                    .iter()
                    .map(|(label, segments)| (media, *label, *segments)),
            )
            .map(|(root, label, segments)| ManifestEntry {
                label,
                path: segments.iter().fold(root.to_path_buf(), |p, s| p.join(s)),
            })
            .collect();

        Self { entries }
    }

    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// What happened to one manifest entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryOutcome {
    Created,
    AlreadyExisted,
    Failed(String),
}

/// Result of skeleton generation
#[derive(Debug, Default)]
pub struct SkeletonResult {
    pub outcomes: Vec<(PathBuf, DirectoryOutcome)>,
}

impl SkeletonResult {
    fn count(&self, pred: impl Fn(&DirectoryOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }

    pub fn created(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::Created))
    }

    pub fn already_existed(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::AlreadyExisted))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, DirectoryOutcome::Failed(_)))
    }

    /// Check if all directories were successfully created or existed
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Get total count of directories processed
    pub fn total_count(&self) -> usize {
        self.outcomes.len()
    }
}

/// Create a single directory with proper error handling
fn create_directory(path: &Path) -> Result<bool> {
    if path.exists() {
        if path.is_dir() {
            Ok(false) // Already exists
        } else {
            anyhow::bail!("Path exists but is not a directory: {}", path.display());
        }
    } else {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        Ok(true) // Newly created
    }
}

/// Ensure every manifest entry exists, in manifest order
pub fn materialize(manifest: &DirectoryManifest) -> SkeletonResult {
    let outcomes = manifest
        .entries()
        .iter()
        .map(|entry| {
            let outcome = match create_directory(&entry.path) {
                Ok(true) => DirectoryOutcome::Created,
                Ok(false) => DirectoryOutcome::AlreadyExisted,
                Err(e) => {
                    tracing::warn!(path = %entry.path.display(), "directory creation failed: {e:#}");
                    DirectoryOutcome::Failed(format!("{e:#}"))
                }
            };
            tracing::debug!(label = entry.label, ?outcome, "skeleton entry");
            (entry.path.clone(), outcome)
        })
        .collect();

    SkeletonResult { outcomes }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn roots(dir: &Path) -> PathPair {
        PathPair {
            base_path: dir.join("docker").display().to_string(),
            media_path: dir.join("share").display().to_string(),
        }
    }

    #[test]
    fn test_manifest_layout() {
        let pair = PathPair::new("/srv/docker", "/srv/share").unwrap();
        let manifest = DirectoryManifest::for_roots(&pair);

        assert_eq!(manifest.len(), DirectoryManifest::LEN);
        assert_eq!(manifest.len(), 12);

        let paths: Vec<_> = manifest.entries().iter().map(|e| e.path.clone()).collect();
        assert_eq!(paths[0], PathBuf::from("/srv/docker/plex/config"));
        assert_eq!(paths[6], PathBuf::from("/srv/docker/gluetun"));
        assert_eq!(paths[7], PathBuf::from("/srv/share/media/movies"));
        assert_eq!(paths[11], PathBuf::from("/srv/share/downloads/incomplete"));

        let base_rooted = paths.iter().filter(|p| p.starts_with("/srv/docker")).count();
        assert_eq!(base_rooted, 7);
    }

    #[test]
    fn test_manifest_is_deterministic_and_unique() {
        let pair = PathPair::new("/data", "/data").unwrap();
        let first = DirectoryManifest::for_roots(&pair);
        let second = DirectoryManifest::for_roots(&pair);
        assert_eq!(first, second);

        // Same root for both halves still yields distinct entries
        let unique: HashSet<_> = first.entries().iter().map(|e| &e.path).collect();
        assert_eq!(unique.len(), first.len());
    }

    #[test]
    fn test_materialize_then_rerun_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let manifest = DirectoryManifest::for_roots(&roots(tmp.path()));

        let first = materialize(&manifest);
        assert_eq!(first.created(), 12);
        assert_eq!(first.already_existed(), 0);
        assert!(first.is_success());
        for entry in manifest.entries() {
            assert!(entry.path.is_dir(), "{} missing", entry.path.display());
        }

        let second = materialize(&manifest);
        assert_eq!(second.created(), 0);
        assert_eq!(second.already_existed(), 12);
        assert_eq!(second.total_count(), first.total_count());
    }

    #[test]
    fn test_single_failure_does_not_stop_the_rest() {
        let tmp = tempfile::tempdir().unwrap();
        let pair = roots(tmp.path());
        // A plain file where the radarr directory should go
        fs::create_dir_all(Path::new(&pair.base_path)).unwrap();
        fs::write(Path::new(&pair.base_path).join("radarr"), b"not a dir").unwrap();

        let manifest = DirectoryManifest::for_roots(&pair);
        let result = materialize(&manifest);

        assert_eq!(result.failed(), 1);
        assert_eq!(result.created(), 11);
        assert_eq!(
            result.created() + result.already_existed() + result.failed(),
            manifest.len()
        );
        assert!(!result.is_success());

        let (path, outcome) = &result.outcomes[1];
        assert!(path.ends_with("radarr/config"));
        assert!(matches!(outcome, DirectoryOutcome::Failed(_)));
        // Entries after the failure were still attempted
        assert!(Path::new(&pair.media_path).join("downloads/incomplete").is_dir());
    }

    #[test]
    fn test_existing_file_reported_as_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("occupied");
        fs::write(&file, b"x").unwrap();

        let err = create_directory(&file).unwrap_err();
        assert!(err.to_string().contains("not a directory"));
    }
}
