//! Host to container path translation
//!
//! Docker Desktop on Windows mounts drives under `/mnt/<letter>`, so a
//! host path like `C:\docker` is visible to the containers as `/mnt/c/docker`.

/// Where drive letters are mounted inside the container VM
pub const MOUNT_ROOT: &str = "/mnt";

/// Rewrite a host path into the form the compose file mounts.
///
/// Drive-letter paths move under [`MOUNT_ROOT`]; every path gets forward
/// slashes with duplicates collapsed and no trailing slash.
pub fn to_container_path(host: &str) -> String {
    let mut chars = host.chars();
    let translated = match (chars.next(), chars.next()) {
        (Some(drive), Some(':')) if drive.is_ascii_alphabetic() => format!(
            "{MOUNT_ROOT}/{}/{}",
            drive.to_ascii_lowercase(),
            &host[2..]
        ),
        _ => host.to_string(),
    };

    let mut out = String::with_capacity(translated.len());
    for c in translated.chars() {
        let c = if c == '\\' { '/' } else { c };
        if c == '/' && out.ends_with('/') {
            continue;
        }
        out.push(c);
    }

    if out.len() > 1 && out.ends_with('/') {
        out.pop();
    }
    out
}
