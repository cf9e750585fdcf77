//! GitHub-backed activity source
//!
//! Activity reports come from the `github-activity` tool (or a replacement given in
//! config); single-PR and repository lookups go through `gh api`. Tokens are handed
//! to both tools through the environment so they never show up in the command echo.

use super::{ActivitySource, PullRequestInfo};
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::runner::{CommandRunner, CommandSpec};
use serde::Deserialize;

pub struct GithubActivity<'r> {
  runner: &'r dyn CommandRunner,
  activity_cmd: String,
  auth: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiUser {
  login: String,
  html_url: String,
}

#[derive(Debug, Deserialize)]
struct ApiPullRequest {
  number: u64,
  title: String,
  html_url: String,
  user: ApiUser,
}

#[derive(Debug, Deserialize)]
struct ApiRepository {
  full_name: String,
  #[serde(default)]
  source: Option<Box<ApiRepository>>,
}

impl<'r> GithubActivity<'r> {
  pub fn new(runner: &'r dyn CommandRunner, activity_cmd: &str, auth: Option<String>) -> Self {
    Self {
      runner,
      activity_cmd: activity_cmd.to_string(),
      auth,
    }
  }

  fn with_auth(&self, mut spec: CommandSpec) -> CommandSpec {
    if let Some(token) = &self.auth {
      spec = spec.env("GITHUB_ACCESS_TOKEN", token.as_str()).env("GH_TOKEN", token.as_str());
    }
    spec
  }

  fn api(&self, endpoint: &str) -> ReleaseResult<String> {
    let spec = self.with_auth(CommandSpec::new(["gh", "api"]).arg(endpoint));
    self.runner.run(&spec)
  }
}

impl ActivitySource for GithubActivity<'_> {
  fn fetch_activity(&self, repo: &str, since: &str) -> ReleaseResult<String> {
    let spec = CommandSpec::parse(&self.activity_cmd)?
      .arg(repo)
      .args(["--since", since, "--kind", "pr"]);
    self.runner.run(&self.with_auth(spec))
  }

  fn fetch_pull_request(&self, repo: &str, number: u64) -> ReleaseResult<PullRequestInfo> {
    let body = self.api(&format!("repos/{}/pulls/{}", repo, number))?;
    let pr: ApiPullRequest =
      serde_json::from_str(&body).with_context(|| format!("Unexpected response for {}#{}", repo, number))?;

    Ok(PullRequestInfo {
      number: pr.number,
      title: pr.title,
      url: pr.html_url,
      author_login: pr.user.login,
      author_url: pr.user.html_url,
    })
  }

  fn source_repository(&self, repo: &str) -> ReleaseResult<String> {
    let body = self.api(&format!("repos/{}", repo))?;
    let info: ApiRepository =
      serde_json::from_str(&body).with_context(|| format!("Unexpected response for {}", repo))?;

    Ok(info.source.map(|source| source.full_name).unwrap_or(info.full_name))
  }
}
