//! Changelog entry synthesis
//!
//! Turns the Markdown activity report for a release window into the entry for one
//! version:
//!
//! ```text
//! ## 1.2.0
//!
//! ([Full Changelog](https://github.com/org/repo/compare/v1.1.0...abc123))
//!
//! ### Merged PRs
//! - Fix widget [#12](...) ([@alice](...))
//!
//! ### Contributors to this release
//! ...
//! ```

use super::backport::BackportResolver;
use crate::activity::ActivitySource;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;

const FULL_CHANGELOG_LABEL: &str = "full changelog";
const MERGED_PRS_HEADING: &str = "## Merged PRs";
const CONTRIBUTORS_HEADING: &str = "## Contributors";

/// Where a line of the activity report falls
///
/// The PR list has no closing token: everything after the `## Merged PRs` heading
/// belongs to it, and a `## Contributors` heading only switches to the contributors
/// block, which runs to the end of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
  BeforeSection,
  InPullRequests,
  InContributors,
}

impl Section {
  fn next(self, line: &str) -> Self {
    let trimmed = line.trim();
    match self {
      Section::BeforeSection if trimmed.starts_with(MERGED_PRS_HEADING) => Section::InPullRequests,
      Section::InPullRequests if trimmed.starts_with(CONTRIBUTORS_HEADING) => Section::InContributors,
      other => other,
    }
  }
}

/// Parts of an activity report that make it into the entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActivityDigest {
  /// Comparison link line, label title-cased
  pub full_changelog: Option<String>,
  /// Lines after the `## Merged PRs` heading, list markers already normalised
  pub pull_requests: Vec<String>,
}

/// Classify the report line by line
pub fn parse_activity(markdown: &str) -> ActivityDigest {
  let mut digest = ActivityDigest::default();
  let mut section = Section::BeforeSection;

  for line in markdown.lines() {
    let next = section.next(line);

    match (section, next) {
      (Section::BeforeSection, Section::BeforeSection) => {
        if line.contains(&format!("[{}]", FULL_CHANGELOG_LABEL)) {
          digest.full_changelog = Some(line.replace(FULL_CHANGELOG_LABEL, "Full Changelog"));
        }
      }
      // The heading itself is dropped; the entry carries the version heading instead
      (Section::BeforeSection, Section::InPullRequests) => {}
      (Section::InPullRequests, Section::InContributors) => {
        digest.pull_requests.push(promote_heading(line));
      }
      (_, _) => digest.pull_requests.push(normalize_list_marker(line)),
    }

    section = next;
  }

  digest
}

/// `## Contributors...` becomes `### Contributors...` to nest under the version heading
fn promote_heading(line: &str) -> String {
  let indent = line.len() - line.trim_start().len();
  format!("{}#{}", &line[..indent], &line[indent..])
}

/// `* item` becomes `- item`, keeping indentation of nested items
fn normalize_list_marker(line: &str) -> String {
  let indent = line.len() - line.trim_start().len();
  match line[indent..].strip_prefix("* ") {
    Some(rest) => format!("{}- {}", &line[..indent], rest),
    None => line.to_string(),
  }
}

/// Entry for a release window with nothing merged
pub fn empty_entry(version: &str) -> String {
  render_entry(version, &ActivityDigest::default())
}

/// Assemble heading, comparison link and PR list
///
/// A digest without PR lines still gets a `## Merged PRs` section reading `None!`.
pub fn render_entry(version: &str, digest: &ActivityDigest) -> String {
  let mut blocks = vec![format!("## {}", version)];

  if let Some(link) = &digest.full_changelog {
    blocks.push(link.trim().to_string());
  }

  let prs = digest.pull_requests.join("\n");
  let prs = prs.trim();
  if prs.is_empty() {
    return format!("{}\n{}\nNone!", blocks.join("\n\n"), MERGED_PRS_HEADING);
  }

  blocks.push(prs.to_string());
  blocks.join("\n\n").trim().to_string()
}

/// Builds the entry for a version from git tags and pull-request activity
pub struct EntrySynthesizer<'a> {
  git: &'a SystemGit<'a>,
  activity: &'a dyn ActivitySource,
  backports: Option<BackportResolver>,
}

impl<'a> EntrySynthesizer<'a> {
  pub fn new(git: &'a SystemGit<'a>, activity: &'a dyn ActivitySource) -> Self {
    Self {
      git,
      activity,
      backports: None,
    }
  }

  pub fn with_backports(mut self, resolver: BackportResolver) -> Self {
    self.backports = Some(resolver);
    self
  }

  /// Entry for `version` covering everything merged into `target_ref` since its latest tag
  pub fn synthesize(&self, target_ref: &str, repo: &str, version: &str) -> ReleaseResult<String> {
    let since = self.git.last_merged_tag(target_ref)?;
    println!("🔎 Getting changes to {} since {}...", repo, since);

    let markdown = self.activity.fetch_activity(repo, &since)?;
    if markdown.trim().is_empty() {
      println!("   No PRs found");
      return Ok(empty_entry(version));
    }

    let mut digest = parse_activity(&markdown);
    tracing::debug!(
      lines = digest.pull_requests.len(),
      has_compare_link = digest.full_changelog.is_some(),
      "parsed activity report"
    );

    if let Some(resolver) = &self.backports {
      digest.pull_requests = resolver.resolve(&digest.pull_requests, repo, self.activity)?;
    }

    Ok(render_entry(version, &digest))
  }
}
