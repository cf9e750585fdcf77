//! Integration tests for `release-helper prep-env`

use crate::helpers::{TestPackage, run_release_helper};
use anyhow::Result;

#[test]
fn test_prep_env_prints_and_exports_values() -> Result<()> {
  let pkg = TestPackage::new()?;
  let env_file = pkg.scratch_path("github_env");
  std::fs::write(&env_file, "EARLIER=1\n")?;
  let env_file_arg = env_file.to_string_lossy().to_string();

  let output = run_release_helper(
    &pkg.path,
    &["prep-env"],
    &[
      ("GITHUB_REF", "refs/heads/main"),
      ("REPOSITORY", "org/widget"),
      ("GITHUB_ENV", env_file_arg.as_str()),
    ],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  for line in ["version=0.0.1", "branch=main", "repo=org/widget", "is_prerelease=false"] {
    assert!(stdout.lines().any(|l| l == line), "missing {} in:\n{}", line, stdout);
  }
  assert!(stdout.contains("+ git fetch upstream main --tags"));

  assert_eq!(
    std::fs::read_to_string(&env_file)?,
    "EARLIER=1\nBRANCH=main\nVERSION=0.0.1\nREPOSITORY=org/widget\nIS_PRERELEASE=false\n"
  );

  Ok(())
}

#[test]
fn test_prep_env_prerelease_from_current_branch() -> Result<()> {
  let pkg = TestPackage::new()?;
  pkg.set_version("0.1.0a2")?;
  pkg.commit_all("Pre-release")?;

  let output = run_release_helper(&pkg.path, &["prep-env", "--repo", "org/widget"], &[])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.lines().any(|l| l == "branch=main"));
  assert!(stdout.lines().any(|l| l == "is_prerelease=true"));
  assert!(!stdout.contains("GITHUB_ENV"));

  Ok(())
}
