//! CI environment resolution for `prep-env`
//!
//! GitHub Actions describes the run through a handful of variables. They are read
//! once in main.rs into [`CiEnvironment`] so the resolution logic stays pure.

use super::version::ReleaseVersion;
use crate::core::error::{ReleaseResult, ResultExt};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Identity used for commits made from GitHub Actions
pub const BOT_EMAIL: &str = "41898282+github-actions[bot]@users.noreply.github.com";
pub const BOT_NAME: &str = "GitHub Action";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiEnvironment {
  /// `GITHUB_ACTIONS` is set
  pub github_actions: bool,
  /// `GITHUB_BASE_REF`: target branch of a pull request
  pub base_ref: Option<String>,
  /// `GITHUB_REF`: ref that triggered a push (`refs/heads/main`)
  pub reference: Option<String>,
  /// `GITHUB_REPOSITORY`: `org/name` the workflow runs in
  pub repository: Option<String>,
  /// `GITHUB_ENV`: file downstream steps read variables from
  pub env_file: Option<PathBuf>,
}

impl CiEnvironment {
  pub fn from_env() -> Self {
    Self::from_lookup(|key| std::env::var(key).ok())
  }

  /// Build from any variable lookup; empty values count as unset
  pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
    let get = |key: &str| lookup(key).filter(|v| !v.is_empty());
    Self {
      github_actions: get("GITHUB_ACTIONS").is_some(),
      base_ref: get("GITHUB_BASE_REF"),
      reference: get("GITHUB_REF"),
      repository: get("GITHUB_REPOSITORY"),
      env_file: get("GITHUB_ENV").map(PathBuf::from),
    }
  }

  /// Branch named by the CI run: pull request base first, then the pushed ref's last segment
  pub fn branch(&self) -> Option<String> {
    if let Some(base) = &self.base_ref {
      return Some(base.clone());
    }

    self
      .reference
      .as_deref()
      .and_then(|r| r.rsplit('/').next())
      .filter(|b| !b.is_empty())
      .map(str::to_string)
  }
}

/// Values exported to downstream CI steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvReport {
  pub branch: String,
  pub version: ReleaseVersion,
  pub repository: String,
}

impl EnvReport {
  /// `KEY=value` lines in export order
  pub fn lines(&self) -> Vec<String> {
    vec![
      format!("BRANCH={}", self.branch),
      format!("VERSION={}", self.version),
      format!("REPOSITORY={}", self.repository),
      format!("IS_PRERELEASE={}", self.version.is_prerelease()),
    ]
  }

  /// Append the export lines to `path`, creating it if needed
  pub fn append_to(&self, path: &Path) -> ReleaseResult<()> {
    let mut file = OpenOptions::new()
      .create(true)
      .append(true)
      .open(path)
      .with_context(|| format!("Failed to open {}", path.display()))?;

    let mut text = self.lines().join("\n");
    text.push('\n');
    file
      .write_all(text.as_bytes())
      .with_context(|| format!("Failed to write {}", path.display()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashMap;
  use std::fs;

  fn ci(vars: &[(&str, &str)]) -> CiEnvironment {
    let vars: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
    CiEnvironment::from_lookup(|key| vars.get(key).cloned())
  }

  #[test]
  fn test_pull_request_base_wins_over_ref() {
    let env = ci(&[("GITHUB_BASE_REF", "1.x"), ("GITHUB_REF", "refs/pull/12/merge")]);
    assert_eq!(env.branch().as_deref(), Some("1.x"));
  }

  #[test]
  fn test_push_ref_last_segment() {
    let env = ci(&[("GITHUB_BASE_REF", ""), ("GITHUB_REF", "refs/heads/main")]);
    assert_eq!(env.branch().as_deref(), Some("main"));
  }

  #[test]
  fn test_no_ci_variables() {
    let env = ci(&[]);
    assert_eq!(env, CiEnvironment::default());
    assert_eq!(env.branch(), None);
  }

  #[test]
  fn test_report_lines_and_append() {
    let report = EnvReport {
      branch: "main".to_string(),
      version: ReleaseVersion::parse("2.0.0rc1").unwrap(),
      repository: "org/widget".to_string(),
    };

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("github_env");
    fs::write(&path, "EXISTING=1\n").unwrap();
    report.append_to(&path).unwrap();

    assert_eq!(
      fs::read_to_string(&path).unwrap(),
      "EXISTING=1\nBRANCH=main\nVERSION=2.0.0rc1\nREPOSITORY=org/widget\nIS_PRERELEASE=true\n"
    );
  }
}
