//! Pull-request activity sources
//!
//! The changelog engine never talks to GitHub directly. It asks an
//! [`ActivitySource`] for the Markdown activity report of a release window and
//! for the details of single pull requests (backport resolution).

use crate::core::error::ReleaseResult;

pub mod github;

pub use github::GithubActivity;

/// Details of one pull request, enough to render a changelog line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestInfo {
  pub number: u64,
  pub title: String,
  pub url: String,
  pub author_login: String,
  pub author_url: String,
}

/// Activity source adapter trait
pub trait ActivitySource {
  /// Markdown report of pull requests merged into `repo` since `since`.
  /// An empty string means nothing was merged.
  fn fetch_activity(&self, repo: &str, since: &str) -> ReleaseResult<String>;

  /// Look up a single pull request
  fn fetch_pull_request(&self, repo: &str, number: u64) -> ReleaseResult<PullRequestInfo>;

  /// `org/name` of the repository `repo` was forked from, or `repo` itself
  fn source_repository(&self, repo: &str) -> ReleaseResult<String>;
}
