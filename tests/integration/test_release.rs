//! Integration tests for `release-helper release`

use crate::helpers::{END_MARKER, START_MARKER, TestPackage, run_release_helper};
use anyhow::Result;

const REPORT: &str = "# main@{2021-01-01}...main@{2021-02-01}

([full changelog](https://github.com/org/widget/compare/v0.0.1...abc123))

## Merged PRs

* Add gizmo [#21](https://github.com/org/widget/pull/21) ([@bob](https://github.com/bob))

## Contributors to this release

[@bob](https://github.com/search?q=bob)";

#[cfg(unix)]
#[test]
fn test_release_runs_every_step() -> Result<()> {
  let pkg = TestPackage::new()?;
  let bump_cmd = pkg.bump_script()?.to_string_lossy().to_string();
  let activity = pkg.activity_script(REPORT)?.to_string_lossy().to_string();
  let path = pkg.fake_node_path()?;
  let entry_file = pkg.scratch_path("entry.md");
  let entry_arg = entry_file.to_string_lossy().to_string();

  let output = run_release_helper(
    &pkg.path,
    &[
      "release",
      "--branch",
      "main",
      "--repo",
      "org/widget",
      "--version-spec",
      "1.0.0",
      "--post-version-spec",
      "1.0.1.dev0",
      "--output",
      &entry_arg,
    ],
    &[
      ("VERSION_CMD", bump_cmd.as_str()),
      ("ACTIVITY_CMD", activity.as_str()),
      ("PATH", path.as_str()),
    ],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  let entry = std::fs::read_to_string(&entry_file)?;
  assert!(entry.starts_with("## 1.0.0\n"), "{}", entry);
  assert!(entry.contains("- Add gizmo [#21]"));

  // The release commit carries the reset markers with the entry below them
  let released = pkg.git_stdout(&["show", "v1.0.0:CHANGELOG.md"])?;
  assert!(released.contains(&format!("{}\n{}\n## 1.0.0", START_MARKER, END_MARKER)), "{}", released);
  assert!(pkg.git_stdout(&["show", "v1.0.0:package.json"])?.contains("\"version\": \"1.0.0\""));

  assert_eq!(pkg.git_stdout(&["branch", "--show-current"])?, "release");
  assert_eq!(pkg.git_stdout(&["log", "-1", "--format=%s"])?, "Bump to 1.0.1.dev0");
  assert_eq!(pkg.git_stdout(&["log", "-1", "--skip=1", "--format=%s"])?, "Publish v1.0.0");

  assert!(stdout.contains("+ npm publish --dry-run"));
  assert!(stdout.contains("+ npm run test"));
  assert!(stdout.contains("Release Prep Complete!"));

  Ok(())
}
