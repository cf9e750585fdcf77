//! Git operations over the system `git` binary
//!
//! Thin typed wrapper around [`CommandRunner`]: every method maps to one git
//! invocation, so the command echo doubles as an audit log of what touched the repo.

use crate::core::error::{ConfigError, ReleaseResult};
use crate::core::runner::{CommandRunner, CommandSpec};

/// Git backend using system git through a command runner
pub struct SystemGit<'r> {
  runner: &'r dyn CommandRunner,
}

impl<'r> SystemGit<'r> {
  pub fn new(runner: &'r dyn CommandRunner) -> Self {
    Self { runner }
  }

  fn git<I, S>(&self, args: I) -> CommandSpec
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    CommandSpec::new(["git"]).args(args)
  }

  /// Get current branch name
  pub fn current_branch(&self) -> ReleaseResult<String> {
    self.runner.run(&self.git(["branch", "--show-current"]).quiet())
  }

  /// Tags reachable from `reference`, oldest first
  pub fn merged_tags(&self, reference: &str) -> ReleaseResult<Vec<String>> {
    let stdout = self
      .runner
      .run(&self.git(["tag", "--merged", reference, "--sort=creatordate"]))?;
    Ok(non_empty_lines(&stdout))
  }

  /// The most recent tag merged into `reference`: the "since" boundary of a release
  pub fn last_merged_tag(&self, reference: &str) -> ReleaseResult<String> {
    self.merged_tags(reference)?.pop().ok_or_else(|| {
      ConfigError::NoTagFound {
        branch: reference.to_string(),
      }
      .into()
    })
  }

  /// All tags in the repository
  pub fn tags(&self) -> ReleaseResult<Vec<String>> {
    let stdout = self.runner.run(&self.git(["--no-pager", "tag"]))?;
    Ok(non_empty_lines(&stdout))
  }

  /// Create an annotated tag on HEAD
  pub fn create_annotated_tag(&self, name: &str, message: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git(["tag", name, "-a", "-m", message]))?;
    Ok(())
  }

  /// Fetch a branch from a remote, optionally with tags
  pub fn fetch(&self, remote: &str, branch: &str, tags: bool) -> ReleaseResult<()> {
    let mut spec = self.git(["fetch", remote, branch]);
    if tags {
      spec = spec.arg("--tags");
    }
    self.runner.run(&spec)?;
    Ok(())
  }

  /// Discard unstaged working-tree modifications
  pub fn discard_changes(&self) -> ReleaseResult<()> {
    self.runner.run(&self.git(["checkout", "."]))?;
    Ok(())
  }

  /// Create and switch to `branch` starting at `start_point`
  pub fn checkout_new_branch(&self, branch: &str, start_point: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git(["checkout", "-b", branch, start_point]))?;
    Ok(())
  }

  /// Paths with unstaged modifications, from `git diff --numstat`
  pub fn modified_files(&self) -> ReleaseResult<Vec<String>> {
    let stdout = self.runner.run(&self.git(["diff", "--numstat"]).quiet())?;
    Ok(stdout.lines().filter_map(parse_numstat_path).collect())
  }

  /// Unstaged working-tree diff
  pub fn diff(&self) -> ReleaseResult<String> {
    self.runner.run(&self.git(["--no-pager", "diff"]).quiet())
  }

  /// Diff between HEAD and another reference
  pub fn diff_against(&self, reference: &str) -> ReleaseResult<String> {
    self.runner.run(&self.git(["--no-pager", "diff", "HEAD", reference]))
  }

  /// Commit all tracked modifications; each message becomes one `-m` paragraph
  pub fn commit_all(&self, messages: &[String]) -> ReleaseResult<()> {
    let mut spec = self.git(["commit", "-a"]);
    for message in messages {
      spec = spec.arg("-m").arg(message.as_str());
    }
    self.runner.run(&spec)?;
    Ok(())
  }

  /// Subject line of HEAD
  pub fn head_subject(&self) -> ReleaseResult<String> {
    self.runner.run(&self.git(["log", "-1", "--format=%s"]).quiet())
  }

  /// Get remote URL
  pub fn remote_url(&self, remote: &str) -> ReleaseResult<String> {
    self.runner.run(&self.git(["remote", "get-url", remote]))
  }

  /// Add a remote repository
  pub fn add_remote(&self, name: &str, url: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git(["remote", "add", name, url]))?;
    Ok(())
  }

  /// Set a global git config value
  pub fn set_global_config(&self, key: &str, value: &str) -> ReleaseResult<()> {
    self.runner.run(&self.git(["config", "--global", key, value]))?;
    Ok(())
  }
}

fn non_empty_lines(stdout: &str) -> Vec<String> {
  stdout
    .lines()
    .map(|s| s.trim().to_string())
    .filter(|s| !s.is_empty())
    .collect()
}

/// Format: "<added>\t<deleted>\t<path>"
fn parse_numstat_path(line: &str) -> Option<String> {
  let mut parts = line.splitn(3, '\t');
  let _added = parts.next()?;
  let _deleted = parts.next()?;
  parts.next().map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
}
