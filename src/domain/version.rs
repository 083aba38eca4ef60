use crate::error::{ComponentTagError, Result};
use semver::{BuildMetadata, Prerelease, Version};
use std::fmt;

/// Floor version used when neither the inputs nor the history provide one
pub const DEFAULT_STARTING_VERSION: &str = "0.0.0";

/// Version increment applied to the previous release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Major,
    Minor,
    Patch,
}

impl VersionBump {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionBump::Major => "major",
            VersionBump::Minor => "minor",
            VersionBump::Patch => "patch",
        }
    }

    /// Apply this bump to `version`.
    ///
    /// Pre-release and build metadata are always dropped. A pre-release whose
    /// lower components are already zero is released instead of bumped, so
    /// `2.0.0-rc.1` with a major bump becomes `2.0.0`, not `3.0.0`.
    ///
    /// Returns `None` when a component would overflow.
    pub fn apply(&self, version: &Version) -> Option<Version> {
        let is_pre = !version.pre.is_empty();
        let (major, minor, patch) = match self {
            VersionBump::Major => {
                if is_pre && version.minor == 0 && version.patch == 0 {
                    (version.major, 0, 0)
                } else {
                    (version.major.checked_add(1)?, 0, 0)
                }
            }
            VersionBump::Minor => {
                if is_pre && version.patch == 0 {
                    (version.major, version.minor, 0)
                } else {
                    (version.major, version.minor.checked_add(1)?, 0)
                }
            }
            VersionBump::Patch => {
                if is_pre {
                    (version.major, version.minor, version.patch)
                } else {
                    (version.major, version.minor, version.patch.checked_add(1)?)
                }
            }
        };

        Some(Version {
            major,
            minor,
            patch,
            pre: Prerelease::EMPTY,
            build: BuildMetadata::EMPTY,
        })
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip surrounding whitespace and a single leading `v`.
///
/// Idempotent for any input that is a version once normalized:
/// `v1.35.0` and `1.35.0` both yield `1.35.0`.
pub fn normalize_starting_version(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed.strip_prefix('v').unwrap_or(trimmed).to_string()
}

/// Increment `previous` by `bump`.
///
/// Fails when `previous` is malformed or when the increment has no result.
pub fn increment(previous: &str, bump: VersionBump) -> Result<Version> {
    let current = Version::parse(previous).map_err(|e| {
        ComponentTagError::version(format!(
            "cannot apply {} bump to '{}': {}",
            bump, previous, e
        ))
    })?;

    bump.apply(&current).ok_or_else(|| {
        ComponentTagError::version(format!(
            "cannot apply {} bump to '{}': component overflow",
            bump, previous
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_leading_v() {
        assert_eq!(normalize_starting_version("v1.35.0"), "1.35.0");
        assert_eq!(normalize_starting_version("1.35.0"), "1.35.0");
        assert_eq!(normalize_starting_version("  v0.0.0 "), "0.0.0");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for raw in ["v1.2.3", "1.2.3", "v0.0.0", "10.0.1-rc.1"] {
            let once = normalize_starting_version(raw);
            let twice = normalize_starting_version(&once);
            assert_eq!(once, twice, "normalizing '{}' twice changed it", raw);
        }
    }

    #[test]
    fn test_increment_major() {
        assert_eq!(
            increment("1.35.0", VersionBump::Major).unwrap(),
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn test_increment_minor() {
        assert_eq!(
            increment("2.9.0", VersionBump::Minor).unwrap(),
            Version::new(2, 10, 0)
        );
        assert_eq!(
            increment("0.0.0", VersionBump::Minor).unwrap(),
            Version::new(0, 1, 0)
        );
    }

    #[test]
    fn test_increment_patch() {
        assert_eq!(
            increment("1.35.0", VersionBump::Patch).unwrap(),
            Version::new(1, 35, 1)
        );
    }

    #[test]
    fn test_increment_resets_lower_components() {
        assert_eq!(
            increment("1.2.3", VersionBump::Minor).unwrap(),
            Version::new(1, 3, 0)
        );
        assert_eq!(
            increment("1.2.3", VersionBump::Major).unwrap(),
            Version::new(2, 0, 0)
        );
    }

    #[test]
    fn test_increment_releases_prerelease() {
        assert_eq!(
            increment("2.0.0-rc.1", VersionBump::Major).unwrap(),
            Version::new(2, 0, 0)
        );
        assert_eq!(
            increment("1.3.0-beta", VersionBump::Minor).unwrap(),
            Version::new(1, 3, 0)
        );
        assert_eq!(
            increment("1.3.4-beta", VersionBump::Minor).unwrap(),
            Version::new(1, 4, 0)
        );
        assert_eq!(
            increment("1.3.4-beta", VersionBump::Patch).unwrap(),
            Version::new(1, 3, 4)
        );
    }

    #[test]
    fn test_increment_drops_build_metadata() {
        let next = increment("1.0.0+build.5", VersionBump::Patch).unwrap();
        assert_eq!(next.to_string(), "1.0.1");
    }

    #[test]
    fn test_increment_invalid_version_names_label_and_input() {
        let err = increment("not-a-version", VersionBump::Minor).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("minor"), "got: {}", msg);
        assert!(msg.contains("not-a-version"), "got: {}", msg);
    }

    #[test]
    fn test_increment_rejects_v_prefix() {
        assert!(increment("v1.0.0", VersionBump::Patch).is_err());
        assert!(increment("1.2", VersionBump::Patch).is_err());
    }

    #[test]
    fn test_increment_overflow_is_an_error() {
        let raw = format!("{}.0.0", u64::MAX);
        assert!(increment(&raw, VersionBump::Major).is_err());
    }

    #[test]
    fn test_bump_display() {
        assert_eq!(VersionBump::Major.to_string(), "major");
        assert_eq!(VersionBump::Minor.to_string(), "minor");
        assert_eq!(VersionBump::Patch.to_string(), "patch");
    }
}
