//! Release context - built once in main.rs, passed by reference to every command
//!
//! Holds the package root, the effective settings, the detected package manifests,
//! and the two external seams (command runner and activity source). Steps and
//! commands never reach for the process environment or spawn processes themselves.

use crate::activity::ActivitySource;
use crate::adapters::{self, PackageManifest};
use crate::core::config::ReleaseSettings;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::runner::CommandRunner;
use crate::core::vcs::SystemGit;
use crate::release::version::ReleaseVersion;
use crate::utils::{path_to_git_format, repository_from_url};
use std::path::{Path, PathBuf};

pub struct ReleaseContext<'r> {
  /// Package root directory (absolute path)
  pub root: PathBuf,

  pub runner: &'r dyn CommandRunner,

  pub activity: &'r dyn ActivitySource,

  /// Command line, environment, and release.toml merged
  pub settings: ReleaseSettings,

  /// Python first, then Node, when both are present
  pub manifests: Vec<Box<dyn PackageManifest>>,
}

impl<'r> ReleaseContext<'r> {
  pub fn new(
    root: &Path,
    runner: &'r dyn CommandRunner,
    activity: &'r dyn ActivitySource,
    settings: ReleaseSettings,
  ) -> Self {
    Self {
      root: root.to_path_buf(),
      runner,
      activity,
      settings,
      manifests: adapters::detect_all(root),
    }
  }

  pub fn git(&self) -> SystemGit<'r> {
    SystemGit::new(self.runner)
  }

  /// Manifest that owns the package version
  pub fn primary_manifest(&self) -> ReleaseResult<&dyn PackageManifest> {
    adapters::primary(&self.manifests, &self.root)
  }

  /// Manifests of one ecosystem, or all when `ecosystem` is None
  pub fn manifests_for(&self, ecosystem: Option<&str>) -> ReleaseResult<Vec<&dyn PackageManifest>> {
    let selected: Vec<&dyn PackageManifest> = self
      .manifests
      .iter()
      .map(|m| m.as_ref())
      .filter(|m| ecosystem.is_none_or(|e| m.ecosystem() == e))
      .collect();

    if selected.is_empty() {
      return Err(ReleaseError::with_help(
        format!(
          "No {} package found in {}",
          ecosystem.unwrap_or("supported"),
          self.root.display()
        ),
        "Run from the package root (setup.py, pyproject.toml, or package.json).",
      ));
    }

    Ok(selected)
  }

  pub fn current_version(&self) -> ReleaseResult<ReleaseVersion> {
    let raw = self.primary_manifest()?.version(self.runner)?;
    ReleaseVersion::parse(&raw)
  }

  /// Branch from settings, else the checked-out branch
  pub fn branch(&self) -> ReleaseResult<String> {
    match &self.settings.branch {
      Some(branch) => Ok(branch.clone()),
      None => self.git().current_branch(),
    }
  }

  /// `remote/branch`
  pub fn target_ref(&self) -> ReleaseResult<String> {
    Ok(self.settings.target_ref(&self.branch()?))
  }

  /// `org/name` from settings, else derived from the remote's URL
  pub fn repository(&self) -> ReleaseResult<String> {
    if let Some(repo) = &self.settings.repository {
      return Ok(repo.clone());
    }

    let url = self.git().remote_url(&self.settings.remote)?;
    repository_from_url(&url).ok_or_else(|| {
      ReleaseError::with_help(
        format!("Could not derive a repository name from remote URL '{}'", url),
        "Pass --repo (or set REPOSITORY) as org/name.",
      )
    })
  }

  pub fn changelog_path(&self) -> PathBuf {
    self.root.join(&self.settings.changelog)
  }

  /// Changelog path as git reports it in diffs
  pub fn changelog_git_path(&self) -> String {
    let path = self.changelog_path();
    path_to_git_format(path.strip_prefix(&self.root).unwrap_or(&path))
  }
}
