//! Shared utilities for the builder module.

use std::path::Path;

use anyhow::{bail, Result};

use crate::util::process::ProcessBuilder;

/// Detect a tool's version by running it with --version and parsing the output.
///
/// # Example
/// ```ignore
/// let version = detect_tool_version(Path::new("cmake"), parse_cmake_version)?;
/// ```
pub fn detect_tool_version<F>(tool: &Path, version_parser: F) -> Result<semver::Version>
where
    F: FnOnce(&str) -> Option<semver::Version>,
{
    let output = ProcessBuilder::new(tool).arg("--version").exec()?;

    if !output.status.success() {
        bail!("{} --version failed", tool.display());
    }

    let stdout = String::from_utf8_lossy(&output.stdout);

    version_parser(&stdout).ok_or_else(|| {
        anyhow::anyhow!("could not parse {} version from output: {}", tool.display(), stdout)
    })
}

/// Parse the first line of `cmake --version` ("cmake version 3.28.1").
pub fn parse_cmake_version(stdout: &str) -> Option<semver::Version> {
    stdout
        .lines()
        .find_map(|line| line.strip_prefix("cmake version "))
        .and_then(parse_version_flexible)
}

/// Parse a version string into semver::Version, handling incomplete versions.
///
/// Handles versions like "3.20.5", "3.28.0-rc2", "1.11.1.git" or versions
/// with only major.minor parts.
pub fn parse_version_flexible(version_str: &str) -> Option<semver::Version> {
    let clean_version = version_str
        .trim()
        .split(|c: char| !c.is_ascii_digit() && c != '.')
        .next()
        .unwrap_or(version_str)
        .trim_end_matches('.');

    if let Ok(v) = clean_version.parse() {
        return Some(v);
    }

    let parts: Vec<&str> = clean_version.split('.').collect();
    let major = parts.first().and_then(|s| s.parse().ok())?;
    let minor = parts.get(1).and_then(|s| s.parse().ok()).unwrap_or(0);
    let patch = parts.get(2).and_then(|s| s.parse().ok()).unwrap_or(0);

    Some(semver::Version::new(major, minor, patch))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cmake_version() {
        let out = "cmake version 3.28.1\n\nCMake suite maintained and supported by Kitware (kitware.com/cmake).\n";
        assert_eq!(parse_cmake_version(out), Some(semver::Version::new(3, 28, 1)));
    }

    #[test]
    fn test_parse_cmake_version_rc() {
        let out = "cmake version 3.29.0-rc2\n";
        assert_eq!(parse_cmake_version(out), Some(semver::Version::new(3, 29, 0)));
    }

    #[test]
    fn test_parse_version_flexible() {
        assert_eq!(parse_version_flexible("1.11.1.git"), Some(semver::Version::new(1, 11, 1)));
        assert_eq!(parse_version_flexible("3.20"), Some(semver::Version::new(3, 20, 0)));
        assert_eq!(parse_version_flexible("garbage"), None);
    }

    #[test]
    fn test_parse_cmake_version_missing() {
        assert_eq!(parse_cmake_version("ninja 1.11.1"), None);
    }
}
