/// Python packaging adapter
///
/// Supports projects described by:
/// - pyproject.toml with a static `[project]` table (built with `python -m build`)
/// - setup.py (sdist + bdist_wheel)
use super::{Artifact, PackageManifest};
use crate::core::config::ReleaseSettings;
use crate::core::error::{ArtifactError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::runner::{CommandRunner, CommandSpec};
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::DocumentMut;

const DIST_DIR: &str = "dist";

/// Installable distribution kinds smoke-tested after a build
const TESTED_PATTERNS: &[&str] = &["*.tar.gz", "*.whl"];

pub struct PythonManifest {
  root: PathBuf,
}

impl PythonManifest {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }

  pub fn can_handle(root: &Path) -> bool {
    root.join("pyproject.toml").exists() || root.join("setup.py").exists()
  }

  fn has_pyproject(&self) -> bool {
    self.root.join("pyproject.toml").exists()
  }

  fn has_setup_py(&self) -> bool {
    self.root.join("setup.py").exists()
  }

  /// Static `[project]` field from pyproject.toml, if declared there
  fn pyproject_field(&self, field: &str) -> ReleaseResult<Option<String>> {
    let path = self.root.join("pyproject.toml");
    if !path.exists() {
      return Ok(None);
    }

    let content = fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    let doc: DocumentMut = content
      .parse()
      .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(
      doc
        .get("project")
        .and_then(|project| project.get(field))
        .and_then(|value| value.as_str())
        .map(str::to_string),
    )
  }

  /// Static field, falling back to asking setup.py
  fn metadata(&self, runner: &dyn CommandRunner, field: &str) -> ReleaseResult<String> {
    if let Some(value) = self.pyproject_field(field)? {
      return Ok(value);
    }

    if self.has_setup_py() {
      let flag = format!("--{}", field);
      return runner.run(&CommandSpec::new(["python", "setup.py", flag.as_str()]).quiet());
    }

    Err(ReleaseError::with_help(
      format!("Could not determine the Python package {}", field),
      format!("Declare `{}` statically in [project] or provide a setup.py.", field),
    ))
  }

  /// Files in dist/, in directory enumeration order, as `dist/<name>`
  fn dist_files(&self) -> ReleaseResult<Vec<PathBuf>> {
    let dir = self.root.join(DIST_DIR);
    if !dir.is_dir() {
      return Ok(Vec::new());
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(&dir).with_context(|| format!("Failed to list {}", dir.display()))? {
      let entry = entry?;
      if entry.file_type()?.is_file() {
        files.push(Path::new(DIST_DIR).join(entry.file_name()));
      }
    }
    Ok(files)
  }

  fn default_test_cmd(&self, runner: &dyn CommandRunner) -> ReleaseResult<String> {
    let name = self.name(runner)?;
    Ok(format!("python -c \"import {}\"", name.replace('-', "_")))
  }

  /// Create a venv, install `dist_file` into it, and run the test command from the venv's bin
  fn test_in_venv(&self, runner: &dyn CommandRunner, dist_file: &Path, test_cmd: &str) -> ReleaseResult<()> {
    let venv = tempfile::Builder::new().prefix("release-venv-").tempdir()?;
    let bin = venv.path().join("bin");
    let bin_path = |exe: &str| bin.join(exe).to_string_lossy().to_string();
    let dist_file = self.root.join(dist_file).to_string_lossy().to_string();

    runner.run(&CommandSpec::new(["python", "-m", "venv"]).arg(venv.path().to_string_lossy()))?;
    runner.run(&CommandSpec::new([bin_path("python")]).args(["-m", "pip", "install", "-U", "-q", "pip"]))?;
    runner.run(&CommandSpec::new([bin_path("pip")]).args(["install", "-q"]).arg(dist_file))?;

    let mut spec = CommandSpec::parse(test_cmd)?;
    spec.argv[0] = bin_path(&spec.argv[0]);
    runner.run(&spec.cwd(venv.path()))?;

    Ok(())
  }
}

impl PackageManifest for PythonManifest {
  fn ecosystem(&self) -> &'static str {
    "python"
  }

  fn version(&self, runner: &dyn CommandRunner) -> ReleaseResult<String> {
    self.metadata(runner, "version")
  }

  fn name(&self, runner: &dyn CommandRunner) -> ReleaseResult<String> {
    self.metadata(runner, "name")
  }

  fn build(&self, runner: &dyn CommandRunner, _settings: &ReleaseSettings) -> ReleaseResult<()> {
    let dist = self.root.join(DIST_DIR);
    if dist.exists() {
      fs::remove_dir_all(&dist).with_context(|| format!("Failed to remove {}", dist.display()))?;
    }

    if self.has_pyproject() {
      runner.run(&CommandSpec::new(["python", "-m", "build", "."]))?;
    } else {
      runner.run(&CommandSpec::new(["python", "setup.py", "sdist"]))?;
      runner.run(&CommandSpec::new(["python", "setup.py", "bdist_wheel"]))?;
    }

    let files = self.dist_files()?;
    runner.run(&CommandSpec::new(["twine", "check"]).args(files.iter().map(|f| f.to_string_lossy().to_string())))?;

    Ok(())
  }

  fn test(&self, runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<()> {
    let test_cmd = match &settings.test_cmd {
      Some(cmd) => cmd.clone(),
      None => self.default_test_cmd(runner)?,
    };

    let files = self.dist_files()?;
    for pattern in TESTED_PATTERNS {
      let pattern = glob::Pattern::new(pattern)?;
      let dist_file = files
        .iter()
        .find(|f| f.file_name().is_some_and(|name| pattern.matches(&name.to_string_lossy())))
        .ok_or_else(|| ArtifactError::Missing {
          expected: settings.dist_count,
          found: files.len(),
          location: self.root.join(DIST_DIR),
        })?;

      println!("🧪 Testing {} in a fresh environment", dist_file.display());
      self.test_in_venv(runner, dist_file, &test_cmd)?;
    }

    Ok(())
  }

  fn collect_artifacts(&self, _runner: &dyn CommandRunner, settings: &ReleaseSettings) -> ReleaseResult<Vec<Artifact>> {
    let files = self.dist_files()?;
    if files.len() != settings.dist_count {
      return Err(
        ArtifactError::Missing {
          expected: settings.dist_count,
          found: files.len(),
          location: self.root.join(DIST_DIR),
        }
        .into(),
      );
    }

    Ok(
      files
        .into_iter()
        .map(|path| Artifact { path, transient: false })
        .collect(),
    )
  }
}
