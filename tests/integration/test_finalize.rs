//! Integration tests for `release-helper finalize-release`

use crate::helpers::{TestPackage, run_release_helper, run_release_helper_raw};
use anyhow::Result;

#[test]
fn test_finalize_release_commits_and_tags() -> Result<()> {
  let pkg = TestPackage::new()?;
  pkg.set_version("1.0.0")?;

  let output = run_release_helper(&pkg.path, &["finalize-release", "--branch", "main"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert_eq!(pkg.git_stdout(&["branch", "--show-current"])?, "release");
  assert_eq!(pkg.git_stdout(&["log", "-1", "--format=%s"])?, "Publish v1.0.0");
  assert!(pkg.git_stdout(&["log", "-1", "--format=%B"])?.contains("SHA256 hashes:"));

  let tags = pkg.git_stdout(&["tag"])?;
  assert!(tags.lines().any(|t| t == "v1.0.0"), "tags: {}", tags);
  assert_eq!(
    pkg.git_stdout(&["tag", "-l", "v1.0.0", "--format=%(contents:subject)"])?,
    "Release v1.0.0"
  );

  assert!(stdout.contains("+ git checkout -b release upstream/main"));
  assert!(stdout.contains("Release Prep Complete!"));
  assert!(stdout.contains("git push upstream release --tags"));

  Ok(())
}

#[test]
fn test_finalize_release_fails_when_tag_exists() -> Result<()> {
  let pkg = TestPackage::new()?;
  pkg.set_version("0.0.2")?;
  pkg.commit_all("Bump to 0.0.2")?;
  crate::helpers::git(&pkg.path, &["tag", "v1.0.0"])?;
  pkg.set_version("1.0.0")?;

  let output = run_release_helper_raw(&pkg.path, &["finalize-release", "--branch", "main"], &[])?;

  assert_eq!(output.status.code(), Some(2));
  assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_finalize_release_bumps_to_next_development_version() -> Result<()> {
  let pkg = TestPackage::new()?;
  pkg.set_version("1.0.0")?;
  let bump_cmd = pkg.bump_script()?.to_string_lossy().to_string();

  let output = run_release_helper(
    &pkg.path,
    &["finalize-release", "--branch", "main", "--post-version-spec", "1.0.1.dev0"],
    &[("VERSION_CMD", bump_cmd.as_str())],
  )?;

  let tags = pkg.git_stdout(&["tag"])?;
  assert!(tags.lines().any(|t| t == "v1.0.0"), "tags: {}", tags);
  assert_eq!(pkg.git_stdout(&["log", "-1", "--format=%s"])?, "Bump to 1.0.1.dev0");
  assert_eq!(pkg.git_stdout(&["log", "-1", "--skip=1", "--format=%s"])?, "Publish v1.0.0");

  // The tag stays on the release commit, not on the development bump
  assert_eq!(
    pkg.git_stdout(&["rev-list", "-n", "1", "v1.0.0"])?,
    pkg.git_stdout(&["rev-parse", "HEAD~1"])?
  );
  assert!(pkg.read_file("package.json")?.contains("\"version\": \"1.0.1.dev0\""));
  assert!(String::from_utf8_lossy(&output.stdout).contains("Bumped version to 1.0.1.dev0"));

  Ok(())
}
