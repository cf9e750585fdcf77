/// Node.js packaging adapter (npm)
///
/// Reads name/version/private from package.json. The release artifact is the
/// `npm pack` tarball, created on demand and removed once hashed.
use super::{Artifact, PackageManifest};
use crate::core::config::ReleaseSettings;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::runner::{CommandRunner, CommandSpec};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const DEFAULT_TEST_CMD: &str = "npm run test";

pub struct NodeManifest {
  root: PathBuf,
}

/// package.json structure (minimal fields we care about)
#[derive(Debug, Deserialize)]
struct PackageJson {
  name: String,
  version: String,
  #[serde(default)]
  private: bool,
}

impl NodeManifest {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }

  pub fn can_handle(root: &Path) -> bool {
    root.join("package.json").exists()
  }

  fn read(&self) -> ReleaseResult<PackageJson> {
    let path = self.root.join("package.json");
    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
  }

  /// Run `npm pack` and return the tarball file name (last line of its output)
  fn pack(&self, runner: &dyn CommandRunner) -> ReleaseResult<String> {
    let output = runner.run(&CommandSpec::new(["npm", "pack"]))?;
    output
      .lines()
      .last()
      .map(|line| line.trim().to_string())
      .filter(|line| !line.is_empty())
      .ok_or_else(|| "npm pack did not report a tarball name".into())
  }
}

impl PackageManifest for NodeManifest {
  fn ecosystem(&self) -> &'static str {
    "node"
  }

  fn version(&self, _runner: &dyn CommandRunner) -> ReleaseResult<String> {
    Ok(self.read()?.version)
  }

  fn name(&self, _runner: &dyn CommandRunner) -> ReleaseResult<String> {
    Ok(self.read()?.name)
  }

  fn build(&self, runner: &dyn CommandRunner, _settings: &ReleaseSettings) -> ReleaseResult<()> {
    runner.run(&CommandSpec::new(["npm", "publish", "--dry-run"]))?;
    Ok(())
  }

  fn test(&self, runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<()> {
    let test_cmd = settings.test_cmd.as_deref().unwrap_or(DEFAULT_TEST_CMD);
    runner.run(&CommandSpec::parse(test_cmd)?)?;

    let name = self.read()?.name;
    let tarball = self.root.join(self.pack(runner)?);

    println!("🧪 Installing {} into a scratch project", tarball.display());
    let scratch = tempfile::Builder::new().prefix("release-npm-").tempdir()?;
    let result = (|| -> ReleaseResult<()> {
      runner.run(&CommandSpec::new(["npm", "init", "-y"]).cwd(scratch.path()))?;
      runner.run(
        &CommandSpec::new(["npm", "install"])
          .arg(tarball.to_string_lossy())
          .cwd(scratch.path()),
      )?;
      runner.run(
        &CommandSpec::new(["node", "-e"])
          .arg(format!("require('{}')", name))
          .cwd(scratch.path()),
      )?;
      Ok(())
    })();

    if tarball.exists() {
      fs::remove_file(&tarball).with_context(|| format!("Failed to remove {}", tarball.display()))?;
    }
    result
  }

  fn collect_artifacts(&self, runner: &dyn CommandRunner, _settings: &ReleaseSettings) -> ReleaseResult<Vec<Artifact>> {
    if self.read()?.private {
      tracing::debug!("package.json is private, no tarball to digest");
      return Ok(Vec::new());
    }

    Ok(vec![Artifact {
      path: PathBuf::from(self.pack(runner)?),
      transient: true,
    }])
  }
}
