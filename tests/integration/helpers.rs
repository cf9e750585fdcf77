//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const START_MARKER: &str = "<!-- <START NEW CHANGELOG ENTRY> -->";
pub const END_MARKER: &str = "<!-- <END NEW CHANGELOG ENTRY> -->";

/// Variables the binary reads; cleared so the host CI cannot leak into a test
const RELEASE_ENV_VARS: &[&str] = &[
  "BRANCH",
  "REMOTE",
  "REPOSITORY",
  "GITHUB_ACCESS_TOKEN",
  "CHANGELOG",
  "RESOLVE_BACKPORTS",
  "CHANGELOG_OUTPUT",
  "VERSION_SPEC",
  "VERSION_CMD",
  "POST_VERSION_SPEC",
  "PY_TEST_CMD",
  "ACTIVITY_CMD",
  "GITHUB_ACTIONS",
  "GITHUB_BASE_REF",
  "GITHUB_REF",
  "GITHUB_REPOSITORY",
  "GITHUB_ENV",
];

/// A private npm package in a git repository whose `upstream` remote is itself
pub struct TestPackage {
  _root: TempDir,
  scratch: TempDir,
  pub path: PathBuf,
}

impl TestPackage {
  /// Create the package at version 0.0.1, committed and tagged `v0.0.1`
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let scratch = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let package = Self {
      _root: root,
      scratch,
      path,
    };
    package.set_version("0.0.1")?;
    std::fs::write(
      package.path.join("CHANGELOG.md"),
      format!("# Changelog\n\n{}\n{}\n", START_MARKER, END_MARKER),
    )?;

    git(&package.path, &["add", "."])?;
    git(&package.path, &["commit", "-m", "Initial package"])?;
    git(&package.path, &["tag", "v0.0.1"])?;

    let self_url = package.path.to_string_lossy().to_string();
    git(&package.path, &["remote", "add", "upstream", &self_url])?;
    git(&package.path, &["fetch", "upstream"])?;

    Ok(package)
  }

  /// Rewrite package.json with a new version (left uncommitted)
  pub fn set_version(&self, version: &str) -> Result<()> {
    std::fs::write(
      self.path.join("package.json"),
      format!(
        "{{\n  \"name\": \"widget\",\n  \"version\": \"{}\",\n  \"private\": true\n}}\n",
        version
      ),
    )?;
    Ok(())
  }

  /// Commit all tracked changes
  pub fn commit_all(&self, message: &str) -> Result<()> {
    git(&self.path, &["commit", "-a", "-m", message])?;
    git(&self.path, &["fetch", "upstream"])?;
    Ok(())
  }

  /// Write an executable script outside the repository that prints `report`
  #[cfg(unix)]
  pub fn activity_script(&self, report: &str) -> Result<PathBuf> {
    let script = self.scratch.path().join("activity.sh");
    write_executable(&script, &format!("#!/bin/sh\ncat <<'REPORT'\n{}\nREPORT\n", report))?;
    Ok(script)
  }

  /// Write an executable version bump script that rewrites package.json with `$1`
  #[cfg(unix)]
  pub fn bump_script(&self) -> Result<PathBuf> {
    let script = self.scratch.path().join("bump.sh");
    write_executable(
      &script,
      "#!/bin/sh\nprintf '{\"name\": \"widget\", \"version\": \"%s\", \"private\": true}\\n' \"$1\" > package.json\n",
    )?;
    Ok(script)
  }

  /// PATH value with no-op `npm` and `node` stand-ins ahead of the host's tools
  #[cfg(unix)]
  pub fn fake_node_path(&self) -> Result<String> {
    let bin = self.scratch.path().join("bin");
    std::fs::create_dir_all(&bin)?;
    write_executable(
      &bin.join("npm"),
      "#!/bin/sh\nif [ \"$1\" = pack ]; then echo widget.tgz; fi\n",
    )?;
    write_executable(&bin.join("node"), "#!/bin/sh\nexit 0\n")?;

    let host = std::env::var("PATH").unwrap_or_default();
    Ok(format!("{}:{}", bin.display(), host))
  }

  /// Path for files that must not live in the working tree
  pub fn scratch_path(&self, name: &str) -> PathBuf {
    self.scratch.path().join(name)
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  /// Overwrite a file
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    std::fs::write(self.path.join(path), content)?;
    Ok(())
  }

  /// Trimmed stdout of a git command
  pub fn git_stdout(&self, args: &[&str]) -> Result<String> {
    let output = git(&self.path, args)?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }
}

#[cfg(unix)]
fn write_executable(path: &Path, content: &str) -> Result<()> {
  use std::os::unix::fs::PermissionsExt;

  std::fs::write(path, content)?;
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run release-helper and return its output whatever the exit status
pub fn run_release_helper_raw(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_release-helper");

  let mut cmd = Command::new(bin);
  cmd.current_dir(cwd).args(args);
  for var in RELEASE_ENV_VARS {
    cmd.env_remove(var);
  }
  for (key, value) in envs {
    cmd.env(key, value);
  }

  cmd.output().context("Failed to run release-helper")
}

/// Run release-helper, failing on a non-zero exit
pub fn run_release_helper(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let output = run_release_helper_raw(cwd, args, envs)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "release-helper command failed: release-helper {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
