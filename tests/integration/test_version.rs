//! Integration tests for `release-helper final-version` and `bump-version`

use crate::helpers::{TestPackage, run_release_helper, run_release_helper_raw};
use anyhow::Result;

#[test]
fn test_final_version_strips_suffix() -> Result<()> {
  let pkg = TestPackage::new()?;

  for (input, expected) in [("1.2.0rc1", "1.2.0"), ("2.0.0-beta.3", "2.0.0"), ("0.4.1", "0.4.1")] {
    let output = run_release_helper(&pkg.path, &["final-version", input], &[])?;
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), expected);
  }

  Ok(())
}

#[test]
fn test_final_version_rejects_garbage() -> Result<()> {
  let pkg = TestPackage::new()?;

  let output = run_release_helper_raw(&pkg.path, &["final-version", "next"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("next"));

  Ok(())
}

#[test]
fn test_bump_version_requires_spec() -> Result<()> {
  let pkg = TestPackage::new()?;

  let output = run_release_helper_raw(&pkg.path, &["bump-version"], &[])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("No new version specified"));

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_bump_version_runs_configured_command() -> Result<()> {
  let pkg = TestPackage::new()?;
  let bump_cmd = pkg.bump_script()?.to_string_lossy().to_string();

  let output = run_release_helper(
    &pkg.path,
    &["bump-version", "--version-spec", "0.1.0"],
    &[("VERSION_CMD", bump_cmd.as_str())],
  )?;

  assert!(pkg.read_file("package.json")?.contains("\"version\": \"0.1.0\""));
  assert!(String::from_utf8_lossy(&output.stdout).contains("Version is now 0.1.0"));

  Ok(())
}
