//! Release version handling
//!
//! Versions are whatever the bump tool writes (`1.2.3`, `1.2.3a0`, `2.0.0-rc.1`,
//! `1.2.3.dev0`). Only the leading `major.minor.patch` is interpreted.

use crate::core::error::{ConfigError, ReleaseResult};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static FINAL_VERSION: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"^(\d+)\.(\d+)\.(\d+)").expect("valid version regex"));

/// A package version plus its final (release) part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseVersion {
  raw: String,
  /// Matched `major.minor.patch` text, leading zeros kept
  release: String,
  base: semver::Version,
}

impl ReleaseVersion {
  pub fn parse(version: &str) -> ReleaseResult<Self> {
    let version = version.trim();
    let invalid = || ConfigError::InvalidVersion {
      version: version.to_string(),
    };

    let caps = FINAL_VERSION.captures(version).ok_or_else(invalid)?;
    let release = caps.get(0).map(|m| m.as_str().to_string()).ok_or_else(invalid)?;
    let part = |i: usize| -> ReleaseResult<u64> {
      caps
        .get(i)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| invalid().into())
    };

    Ok(Self {
      raw: version.to_string(),
      release,
      base: semver::Version::new(part(1)?, part(2)?, part(3)?),
    })
  }

  pub fn as_str(&self) -> &str {
    &self.raw
  }

  /// `major.minor.patch` with any pre-release or dev suffix removed
  pub fn final_version(&self) -> String {
    self.release.clone()
  }

  pub fn is_prerelease(&self) -> bool {
    self.release != self.raw
  }

  /// Name of the annotated release tag
  pub fn tag_name(&self) -> String {
    format!("v{}", self.raw)
  }

  /// Ordering of the release parts only; suffixes are not compared
  pub fn base(&self) -> &semver::Version {
    &self.base
  }
}

impl fmt::Display for ReleaseVersion {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.raw)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_final_version_strips_suffixes() {
    for (raw, expected, pre) in [
      ("1.2.3", "1.2.3", false),
      ("1.2.3a0", "1.2.3", true),
      ("2.0.0-rc.1", "2.0.0", true),
      ("0.10.1.dev0", "0.10.1", true),
      ("1.02.3", "1.02.3", false),
      ("1.02.3rc1", "1.02.3", true),
    ] {
      let version = ReleaseVersion::parse(raw).unwrap();
      assert_eq!(version.final_version(), expected);
      assert_eq!(version.is_prerelease(), pre, "{}", raw);
      assert!(raw.starts_with(&version.final_version()));
    }
  }

  #[test]
  fn test_tag_name_uses_full_version() {
    assert_eq!(ReleaseVersion::parse("1.0.0b1").unwrap().tag_name(), "v1.0.0b1");
  }

  #[test]
  fn test_invalid_versions() {
    for raw in ["", "1.2", "v1.2.3", "next"] {
      let err = ReleaseVersion::parse(raw).unwrap_err();
      assert!(err.to_string().contains("major.minor.patch"), "{}", raw);
    }
  }

  #[test]
  fn test_base_ordering() {
    let old = ReleaseVersion::parse("1.9.0").unwrap();
    let new = ReleaseVersion::parse("1.10.0a0").unwrap();
    assert!(new.base() > old.base());
  }
}
