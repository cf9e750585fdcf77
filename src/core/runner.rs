//! Command execution seam
//!
//! Every external tool (git, the version bump tool, package managers, the GitHub
//! activity tools) is invoked through [`CommandRunner`]. The workflow never builds a
//! `std::process::Command` itself, so tests swap in a scripted runner.

use crate::core::error::{CommandError, ReleaseResult};
use std::path::{Path, PathBuf};
use std::process::Command;

/// One command invocation: argv plus optional working directory and extra env
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSpec {
  pub argv: Vec<String>,
  pub cwd: Option<PathBuf>,
  pub env: Vec<(String, String)>,
  /// Suppress the `+ <command>` echo
  pub quiet: bool,
}

impl CommandSpec {
  pub fn new<I, S>(argv: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      argv: argv.into_iter().map(Into::into).collect(),
      ..Default::default()
    }
  }

  /// Split a shell-style command line (`tbump --only-patch 1.0.0`) into argv
  pub fn parse(line: &str) -> ReleaseResult<Self> {
    let argv = shlex::split(line)
      .filter(|argv| !argv.is_empty())
      .ok_or_else(|| CommandError::InvalidCommandLine { line: line.to_string() })?;
    Ok(Self::new(argv))
  }

  pub fn arg(mut self, arg: impl Into<String>) -> Self {
    self.argv.push(arg.into());
    self
  }

  pub fn args<I, S>(mut self, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.argv.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
    self.env.push((key.into(), value.into()));
    self
  }

  pub fn quiet(mut self) -> Self {
    self.quiet = true;
    self
  }

  /// Human-readable, shell-quoted form used for echo lines and error messages
  pub fn display(&self) -> String {
    shlex::try_join(self.argv.iter().map(String::as_str)).unwrap_or_else(|_| self.argv.join(" "))
  }
}

/// Captured result of a finished command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
  /// Standard output, trimmed
  pub stdout: String,
  pub stderr: String,
  pub status: i32,
}

impl CommandOutput {
  pub fn success(&self) -> bool {
    self.status == 0
  }
}

/// Runs commands and captures their output
pub trait CommandRunner {
  /// Execute the command. Only a failure to start is an error here; a non-zero
  /// exit is reported through [`CommandOutput::status`].
  fn execute(&self, spec: &CommandSpec) -> ReleaseResult<CommandOutput>;

  /// Echo (unless quiet), execute, and fail on non-zero exit.
  /// Returns trimmed stdout.
  fn run(&self, spec: &CommandSpec) -> ReleaseResult<String> {
    if !spec.quiet {
      println!("+ {}", spec.display());
    }

    let output = self.execute(spec)?;
    if !output.success() {
      return Err(
        CommandError::Failed {
          command: spec.display(),
          status: output.status,
          stderr: output.stderr,
        }
        .into(),
      );
    }

    Ok(output.stdout)
  }
}

/// Runner backed by real processes, rooted at the package directory
pub struct SystemRunner {
  root: PathBuf,
}

impl SystemRunner {
  pub fn new(root: &Path) -> Self {
    Self {
      root: root.to_path_buf(),
    }
  }
}

impl CommandRunner for SystemRunner {
  fn execute(&self, spec: &CommandSpec) -> ReleaseResult<CommandOutput> {
    let (program, args) = spec
      .argv
      .split_first()
      .ok_or_else(|| CommandError::InvalidCommandLine { line: String::new() })?;

    let mut cmd = Command::new(program);
    cmd.args(args);
    cmd.current_dir(spec.cwd.as_deref().unwrap_or(&self.root));
    for (key, value) in &spec.env {
      cmd.env(key, value);
    }

    let output = cmd.output().map_err(|e| CommandError::Spawn {
      command: spec.display(),
      reason: e.to_string(),
    })?;

    let status = output.status.code().unwrap_or(-1);
    tracing::debug!(command = %spec.display(), status, "command finished");

    Ok(CommandOutput {
      stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
      stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
      status,
    })
  }
}

#[cfg(test)]
pub mod testing {
  //! Scripted runner for unit tests

  use super::*;
  use std::cell::RefCell;

  /// Replies to commands by argv prefix; unknown commands succeed with empty output.
  /// Later registrations win, so a test can change a reply mid-scenario.
  #[derive(Default)]
  pub struct FakeRunner {
    replies: RefCell<Vec<(String, CommandOutput)>>,
    calls: RefCell<Vec<String>>,
  }

  impl FakeRunner {
    pub fn new() -> Self {
      Self::default()
    }

    pub fn respond(&self, prefix: &str, stdout: &str) -> &Self {
      self.replies.borrow_mut().push((
        prefix.to_string(),
        CommandOutput {
          stdout: stdout.to_string(),
          ..Default::default()
        },
      ));
      self
    }

    pub fn fail(&self, prefix: &str, stderr: &str) -> &Self {
      self.replies.borrow_mut().push((
        prefix.to_string(),
        CommandOutput {
          stderr: stderr.to_string(),
          status: 1,
          ..Default::default()
        },
      ));
      self
    }

    /// Every executed command, joined with spaces
    pub fn calls(&self) -> Vec<String> {
      self.calls.borrow().clone()
    }

    pub fn was_called(&self, prefix: &str) -> bool {
      self.calls.borrow().iter().any(|c| c.starts_with(prefix))
    }
  }

  impl CommandRunner for FakeRunner {
    fn execute(&self, spec: &CommandSpec) -> ReleaseResult<CommandOutput> {
      let line = spec.argv.join(" ");
      self.calls.borrow_mut().push(line.clone());

      let replies = self.replies.borrow();
      let reply = replies
        .iter()
        .rev()
        .find(|(prefix, _)| line.starts_with(prefix.as_str()))
        .map(|(_, output)| output.clone())
        .unwrap_or_default();
      Ok(reply)
    }
  }
}
