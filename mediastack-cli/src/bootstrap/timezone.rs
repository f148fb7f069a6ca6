//! Timezone detection for the generated `TZ` value
//!
//! This is a deliberately coarse heuristic: the host identifier is matched
//! against a handful of name fragments and collapsed onto one of four US
//! regions. Anything unrecognized falls back to [`Region::DEFAULT`].

use snafu::{Snafu, ensure};
use std::fmt;
use std::path::Path;

/// US regions the stack knows how to configure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Eastern,
    Central,
    Mountain,
    Pacific,
}

/// Name fragments per region, checked in order.
/// Windows display names ("Pacific Standard Time") and IANA city names both appear.
const FRAGMENTS: &[(Region, &[&str])] = &[
    (Region::Eastern, &["Eastern", "New_York", "Detroit", "Toronto", "EST5EDT"]),
    (Region::Central, &["Central", "Chicago", "Winnipeg", "CST6CDT"]),
    (Region::Mountain, &["Mountain", "Denver", "Phoenix", "Edmonton", "MST7MDT"]),
    (Region::Pacific, &["Pacific", "Los_Angeles", "Vancouver", "PST8PDT"]),
];

impl Region {
    pub const DEFAULT: Region = Region::Eastern;

    /// IANA identifier written to the env file
    pub fn iana(self) -> &'static str {
        match self {
            Region::Eastern => "America/New_York",
            Region::Central => "America/Chicago",
            Region::Mountain => "America/Denver",
            Region::Pacific => "America/Los_Angeles",
        }
    }

    /// Map a raw host identifier onto a region. Never fails.
    pub fn from_host_identifier(raw: Option<&str>) -> Region {
        let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
            return Region::DEFAULT;
        };

        FRAGMENTS
            .iter()
            .find(|(_, fragments)| fragments.iter().any(|f| raw.contains(f)))
            .map_or(Region::DEFAULT, |(region, _)| *region)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.iana())
    }
}

/// Best-effort lookup of the host's timezone identifier
pub fn detect_host_timezone() -> Option<String> {
    if let Some(tz) = std::env::var("TZ").ok().filter(|s| !s.trim().is_empty()) {
        tracing::debug!(source = "TZ", %tz, "host timezone");
        return Some(tz.trim_start_matches(':').to_string());
    }

    if let Ok(contents) = std::fs::read_to_string("/etc/timezone") {
        let tz = contents.trim();
        if !tz.is_empty() {
            tracing::debug!(source = "/etc/timezone", %tz, "host timezone");
            return Some(tz.to_string());
        }
    }

    if let Some(tz) = zone_from_localtime(Path::new("/etc/localtime")) {
        tracing::debug!(source = "/etc/localtime", %tz, "host timezone");
        return Some(tz);
    }

    if cfg!(windows) {
        let tz = duct::cmd!("tzutil", "/g")
            .stderr_null()
            .read()
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        if tz.is_some() {
            tracing::debug!(source = "tzutil", ?tz, "host timezone");
            return tz;
        }
    }

    tracing::debug!("host timezone could not be determined");
    None
}

/// `/etc/localtime` is usually a symlink into the zoneinfo tree
fn zone_from_localtime(link: &Path) -> Option<String> {
    let target = std::fs::read_link(link).ok()?;
    let target = target.to_string_lossy();
    target
        .split_once("zoneinfo/")
        .map(|(_, zone)| zone.to_string())
        .filter(|zone| !zone.is_empty())
}

#[derive(Debug, Snafu, PartialEq, Eq)]
pub enum TimezoneError {
    #[snafu(display("timezone must not contain a line break"))]
    LineBreak,
}

/// Check a `--timezone` override. It lands unquoted in the env file.
pub fn parse_timezone(raw: &str) -> Result<String, TimezoneError> {
    ensure!(!raw.contains(['\n', '\r']), LineBreakSnafu);
    Ok(raw.trim().to_string())
}

/// Resolve the `TZ` value: explicit override, otherwise detected region
pub fn resolve_timezone(explicit: Option<&str>) -> String {
    if let Some(raw) = explicit.filter(|s| !s.trim().is_empty()) {
        match parse_timezone(raw) {
            Ok(tz) => return tz,
            Err(e) => tracing::warn!(%e, "ignoring timezone override"),
        }
    }
    Region::from_host_identifier(detect_host_timezone().as_deref())
        .iana()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_windows_display_names() {
        assert_eq!(
            Region::from_host_identifier(Some("Eastern Standard Time")).iana(),
            "America/New_York"
        );
        assert_eq!(
            Region::from_host_identifier(Some("Central Standard Time")),
            Region::Central
        );
        assert_eq!(
            Region::from_host_identifier(Some("Mountain Standard Time")),
            Region::Mountain
        );
        assert_eq!(
            Region::from_host_identifier(Some("Pacific Standard Time")).iana(),
            "America/Los_Angeles"
        );
    }

    #[test]
    fn test_iana_names() {
        assert_eq!(Region::from_host_identifier(Some("America/Chicago")), Region::Central);
        assert_eq!(Region::from_host_identifier(Some("America/Phoenix")), Region::Mountain);
        assert_eq!(Region::from_host_identifier(Some("America/Los_Angeles")), Region::Pacific);
    }

    #[test]
    fn test_unknown_falls_back_to_default() {
        assert_eq!(Region::from_host_identifier(Some("Europe/Berlin")), Region::DEFAULT);
        assert_eq!(Region::from_host_identifier(Some("   ")), Region::DEFAULT);
        assert_eq!(Region::from_host_identifier(None).iana(), "America/New_York");
    }

    #[test]
    fn test_explicit_timezone_wins() {
        assert_eq!(resolve_timezone(Some(" Europe/London ")), "Europe/London");
    }

    #[test]
    fn test_override_with_line_break_is_rejected() {
        assert_eq!(parse_timezone("UTC\nPUID=0"), Err(TimezoneError::LineBreak));
        assert_eq!(parse_timezone("UTC\r"), Err(TimezoneError::LineBreak));
        assert_eq!(parse_timezone(" Asia/Tokyo ").unwrap(), "Asia/Tokyo");

        let tz = resolve_timezone(Some("UTC\nPUID=0"));
        assert!(!tz.contains(['\n', '\r']), "{tz:?}");
        assert_ne!(tz, "UTC");
    }

    #[test]
    fn test_resolve_never_fails() {
        let tz = resolve_timezone(None);
        let known = [
            Region::Eastern,
            Region::Central,
            Region::Mountain,
            Region::Pacific,
        ];
        assert!(known.iter().any(|r| r.iana() == tz));
    }

    #[cfg(unix)]
    #[test]
    fn test_zone_from_localtime_symlink() {
        let tmp = tempfile::tempdir().unwrap();
        let link = tmp.path().join("localtime");
        std::os::unix::fs::symlink("/usr/share/zoneinfo/America/Denver", &link).unwrap();
        assert_eq!(zone_from_localtime(&link).as_deref(), Some("America/Denver"));

        let plain = tmp.path().join("plain");
        std::fs::write(&plain, b"TZif").unwrap();
        assert_eq!(zone_from_localtime(&plain), None);
    }
}
