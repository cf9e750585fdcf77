//! Backport resolution
//!
//! Backport bots open a PR per maintenance branch titled `Backport PR #N: ...`.
//! Listing the bot's PR in a changelog hides who made the change, so those lines are
//! swapped for a line describing the original PR `#N`.

use crate::activity::{ActivitySource, PullRequestInfo};
use crate::core::error::ReleaseResult;
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static BACKPORT_ORIGIN: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"Backport PR #(\d+)").expect("valid backport regex"));

/// Accounts recognised as backport bots
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BotIdentities {
  logins: BTreeSet<String>,
}

impl BotIdentities {
  pub fn new<I, S>(logins: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      logins: logins
        .into_iter()
        .map(|login| login.into().trim_start_matches('@').to_string())
        .filter(|login| !login.is_empty())
        .collect(),
    }
  }

  /// True when the line credits one of the bots (`[@login]`)
  pub fn authored_line(&self, line: &str) -> bool {
    self.logins.iter().any(|login| line.contains(&format!("[@{}]", login)))
  }
}

/// Number of the original PR named by a `Backport PR #N` annotation
pub fn backport_origin(line: &str) -> Option<u64> {
  BACKPORT_ORIGIN
    .captures(line)
    .and_then(|caps| caps.get(1))
    .and_then(|m| m.as_str().parse().ok())
}

/// Render a PR as a changelog list item
pub fn format_pr_entry(pr: &PullRequestInfo) -> String {
  format!(
    "- {} [#{}]({}) ([@{}]({}))",
    pr.title, pr.number, pr.url, pr.author_login, pr.author_url
  )
}

pub struct BackportResolver {
  bots: BotIdentities,
}

impl BackportResolver {
  pub fn new(bots: BotIdentities) -> Self {
    Self { bots }
  }

  /// Replace bot-authored backport lines in place. A bot line without a
  /// `Backport PR #N` annotation is kept as-is.
  pub fn resolve(&self, lines: &[String], repo: &str, activity: &dyn ActivitySource) -> ReleaseResult<Vec<String>> {
    let mut resolved = Vec::with_capacity(lines.len());

    for line in lines {
      if !self.bots.authored_line(line) {
        resolved.push(line.clone());
        continue;
      }

      match backport_origin(line) {
        Some(number) => {
          let pr = activity.fetch_pull_request(repo, number)?;
          tracing::debug!(number, "resolved backport to original pull request");
          resolved.push(format_pr_entry(&pr));
        }
        None => {
          tracing::warn!(line = %line, "bot-authored line has no backport annotation, leaving it unchanged");
          resolved.push(line.clone());
        }
      }
    }

    Ok(resolved)
  }
}
