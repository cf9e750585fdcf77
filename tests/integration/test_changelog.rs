//! Integration tests for `release-helper prep-changelog` and `extract-changelog`

use crate::helpers::{END_MARKER, START_MARKER, TestPackage, run_release_helper_raw};
#[cfg(unix)]
use crate::helpers::run_release_helper;
use anyhow::Result;

#[cfg(unix)]
const REPORT: &str = "# main@{2021-01-01}...main@{2021-02-01}

([full changelog](https://github.com/org/widget/compare/v0.0.1...abc123))

## Merged PRs

* Fix widget [#12](https://github.com/org/widget/pull/12) ([@alice](https://github.com/alice))

## Contributors to this release

[@alice](https://github.com/search?q=alice)";

/// Run prep-changelog for 0.0.2 against `report`, returning the activity command
#[cfg(unix)]
fn prep_changelog(pkg: &TestPackage, report: &str) -> Result<String> {
  let activity = pkg.activity_script(report)?.to_string_lossy().to_string();
  pkg.set_version("0.0.2")?;

  run_release_helper(
    &pkg.path,
    &["prep-changelog", "--branch", "main", "--repo", "org/widget"],
    &[("ACTIVITY_CMD", activity.as_str())],
  )?;
  Ok(activity)
}

#[cfg(unix)]
#[test]
fn test_prep_changelog_injects_entry_and_only_touches_changelog() -> Result<()> {
  let pkg = TestPackage::new()?;
  prep_changelog(&pkg, REPORT)?;

  let changelog = pkg.read_file("CHANGELOG.md")?;
  let expected_start = format!(
    "# Changelog\n\n{}\n## 0.0.2\n\n([Full Changelog](https://github.com/org/widget/compare/v0.0.1...abc123))\n\n- Fix widget [#12]",
    START_MARKER
  );
  assert!(changelog.starts_with(&expected_start), "{}", changelog);
  assert!(changelog.contains("### Contributors to this release"));
  assert!(changelog.ends_with(&format!("[@alice](https://github.com/search?q=alice)\n{}\n", END_MARKER)));

  // The working tree was reset first, so the uncommitted version bump is gone
  let changed = pkg.git_stdout(&["diff", "--name-only"])?;
  assert_eq!(changed, "CHANGELOG.md");

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_prep_changelog_with_no_activity_writes_none_entry() -> Result<()> {
  let pkg = TestPackage::new()?;
  prep_changelog(&pkg, "")?;

  assert_eq!(
    pkg.read_file("CHANGELOG.md")?,
    format!(
      "# Changelog\n\n{}\n## 0.0.2\n## Merged PRs\nNone!\n{}\n",
      START_MARKER, END_MARKER
    )
  );

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_extract_changelog_writes_output_and_resets_markers() -> Result<()> {
  let pkg = TestPackage::new()?;
  let activity = prep_changelog(&pkg, REPORT)?;
  pkg.set_version("0.0.2")?;
  pkg.commit_all("Prepare 0.0.2")?;

  let prepared = pkg.read_file("CHANGELOG.md")?;
  let entry = prepared
    .split_once(&format!("{}\n", START_MARKER))
    .and_then(|(_, rest)| rest.split_once(&format!("\n{}", END_MARKER)))
    .map(|(entry, _)| entry.to_string())
    .expect("prepared entry between markers");

  let output = pkg.scratch_path("entry.md");
  let output_arg = output.to_string_lossy().to_string();
  run_release_helper(
    &pkg.path,
    &["extract-changelog", "--branch", "main", "--repo", "org/widget", "--output", &output_arg],
    &[("ACTIVITY_CMD", activity.as_str())],
  )?;

  assert_eq!(std::fs::read_to_string(&output)?, entry);
  assert_eq!(
    pkg.read_file("CHANGELOG.md")?,
    format!("# Changelog\n\n{}\n{}\n{}\n", START_MARKER, END_MARKER, entry)
  );

  Ok(())
}

#[cfg(unix)]
#[test]
fn test_extract_changelog_fails_when_pr_was_removed() -> Result<()> {
  let pkg = TestPackage::new()?;
  let activity = prep_changelog(&pkg, REPORT)?;
  pkg.set_version("0.0.2")?;

  let edited = pkg
    .read_file("CHANGELOG.md")?
    .lines()
    .filter(|line| !line.contains("[#12]"))
    .collect::<Vec<_>>()
    .join("\n");
  pkg.write_file("CHANGELOG.md", &edited)?;

  let output = run_release_helper_raw(
    &pkg.path,
    &["extract-changelog", "--branch", "main", "--repo", "org/widget"],
    &[("ACTIVITY_CMD", activity.as_str())],
  )?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Missing PR #12 in the changelog"));
  assert_eq!(pkg.read_file("CHANGELOG.md")?, edited);

  Ok(())
}

#[test]
fn test_prep_changelog_without_markers_fails() -> Result<()> {
  let pkg = TestPackage::new()?;
  pkg.write_file("CHANGELOG.md", "# Changelog\n")?;
  pkg.commit_all("Drop markers")?;

  let output = run_release_helper_raw(
    &pkg.path,
    &["prep-changelog", "--branch", "main", "--repo", "org/widget"],
    &[("ACTIVITY_CMD", "false")],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("Missing changelog marker"));

  Ok(())
}
