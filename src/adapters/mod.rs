//! Package-manifest adapters
//!
//! Each packaging ecosystem (Python, Node.js) implements [`PackageManifest`] to read
//! the package version and name, build and smoke-test distributables, and list the
//! artifacts whose digests go into the release commit.
//!
//! Currently supports:
//! - Python (pyproject.toml or setup.py)
//! - JavaScript/TypeScript (package.json, npm)

use crate::core::config::ReleaseSettings;
use crate::core::error::{ConfigError, ReleaseResult};
use crate::core::runner::CommandRunner;
use std::path::{Path, PathBuf};

pub mod node;
pub mod python;

/// Command used when the project ships a tbump configuration
pub const TBUMP_CMD: &str = "tbump --non-interactive --only-patch";

/// A distributable produced by a build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
  /// Path as it should appear in the release commit, relative to the package root
  pub path: PathBuf,
  /// Created only for hashing; removed once the digest is taken
  pub transient: bool,
}

/// Package manifest adapter trait
pub trait PackageManifest {
  /// Ecosystem label for banners and logs
  fn ecosystem(&self) -> &'static str;

  /// Current package version as recorded in the manifest
  fn version(&self, runner: &dyn CommandRunner) -> ReleaseResult<String>;

  /// Importable / requireable package name
  fn name(&self, runner: &dyn CommandRunner) -> ReleaseResult<String>;

  /// Build the distributables and run the ecosystem's metadata checks
  fn build(&self, runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<()>;

  /// Install the built distributables into scratch environments and smoke-test them
  fn test(&self, runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<()>;

  /// Artifacts to digest, in filesystem enumeration order
  fn collect_artifacts(&self, runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<Vec<Artifact>>;
}

/// Detect every manifest present at the package root
///
/// Order is Python then Node, so the Python manifest is the version source when a
/// project ships both.
pub fn detect_all(root: &Path) -> Vec<Box<dyn PackageManifest>> {
  let mut manifests: Vec<Box<dyn PackageManifest>> = Vec::new();

  if python::PythonManifest::can_handle(root) {
    manifests.push(Box::new(python::PythonManifest::new(root)));
  }
  if node::NodeManifest::can_handle(root) {
    manifests.push(Box::new(node::NodeManifest::new(root)));
  }

  manifests
}

/// First detected manifest, or an error naming the directory
pub fn primary<'a>(manifests: &'a [Box<dyn PackageManifest>], root: &Path) -> ReleaseResult<&'a dyn PackageManifest> {
  manifests.first().map(|m| m.as_ref()).ok_or_else(|| {
    ConfigError::ManifestNotFound {
      root: root.to_path_buf(),
    }
    .into()
  })
}

/// Pick a version bump command from the project's tooling config
pub fn detect_version_cmd(root: &Path) -> ReleaseResult<String> {
  for name in ["bumpversion", ".bumpversion", "bump2version", ".bump2version"] {
    if root.join(format!("{}.cfg", name)).exists() {
      return Ok("bump2version".to_string());
    }
  }

  if root.join("tbump.toml").exists() || file_mentions(&root.join("pyproject.toml"), "tbump") {
    return Ok(TBUMP_CMD.to_string());
  }

  if file_mentions(&root.join("setup.cfg"), "bumpversion") {
    return Ok("bump2version".to_string());
  }

  Err(ConfigError::MissingVersionCommand.into())
}

fn file_mentions(path: &Path, needle: &str) -> bool {
  std::fs::read_to_string(path)
    .map(|content| content.contains(needle))
    .unwrap_or(false)
}
