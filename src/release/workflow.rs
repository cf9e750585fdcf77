//! Release workflow state machine
//!
//! ```text
//! Init → VersionBumped → ChangelogPrepared → ChangelogVerified → Built → Tested
//!      → CommitCreated → Tagged → PostBumped → Verified → Done
//! ```
//!
//! A [`Workflow`] is assembled from [`ReleaseStep`]s in state order. Each step
//! performs its side effect, then the workflow checks the step's observable
//! postcondition before advancing. Any failure aborts the run and leaves the
//! working tree as it is; nothing is rolled back or retried.

use super::version::ReleaseVersion;
use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseResult, WorkflowError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReleaseState {
  Init,
  VersionBumped,
  ChangelogPrepared,
  ChangelogVerified,
  Built,
  Tested,
  CommitCreated,
  Tagged,
  PostBumped,
  Verified,
  Done,
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ReleaseState::Init => "init",
      ReleaseState::VersionBumped => "version bumped",
      ReleaseState::ChangelogPrepared => "changelog prepared",
      ReleaseState::ChangelogVerified => "changelog verified",
      ReleaseState::Built => "built",
      ReleaseState::Tested => "tested",
      ReleaseState::CommitCreated => "commit created",
      ReleaseState::Tagged => "tagged",
      ReleaseState::PostBumped => "post-release version bumped",
      ReleaseState::Verified => "verified",
      ReleaseState::Done => "done",
    };
    write!(f, "{}", name)
  }
}

/// Outcome of checking a step's observable effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Postcondition {
  Holds,
  Violated(String),
}

impl Postcondition {
  pub fn check(holds: bool, reason: impl FnOnce() -> String) -> Self {
    if holds { Postcondition::Holds } else { Postcondition::Violated(reason()) }
  }
}

/// Facts established by earlier steps that later steps depend on
#[derive(Debug, Clone, Default)]
pub struct ReleaseRecord {
  /// Version being released. Fixed when the release commit is created, so the
  /// post-release bump does not change what later steps verify.
  pub version: Option<ReleaseVersion>,
  pub tag: Option<String>,
}

impl ReleaseRecord {
  /// Recorded release version, or the manifest's current version
  pub fn release_version(&self, ctx: &ReleaseContext) -> ReleaseResult<ReleaseVersion> {
    match &self.version {
      Some(version) => Ok(version.clone()),
      None => ctx.current_version(),
    }
  }
}

/// One stage of the release
pub trait ReleaseStep {
  /// State reached when this step succeeds
  fn target(&self) -> ReleaseState;

  /// Banner text shown before the step runs
  fn describe(&self) -> String;

  /// Optional steps return false to be skipped
  fn is_enabled(&self, _ctx: &ReleaseContext) -> bool {
    true
  }

  fn run(&mut self, ctx: &ReleaseContext, record: &mut ReleaseRecord) -> ReleaseResult<()>;

  fn verify(&self, ctx: &ReleaseContext, record: &ReleaseRecord) -> ReleaseResult<Postcondition>;
}

pub struct Workflow<'c, 'r> {
  ctx: &'c ReleaseContext<'r>,
  steps: Vec<Box<dyn ReleaseStep + 'c>>,
  state: ReleaseState,
  record: ReleaseRecord,
}

impl<'c, 'r> Workflow<'c, 'r> {
  pub fn new(ctx: &'c ReleaseContext<'r>) -> Self {
    Self {
      ctx,
      steps: Vec::new(),
      state: ReleaseState::Init,
      record: ReleaseRecord::default(),
    }
  }

  /// Append a step; its target must come strictly after the previous step's
  pub fn step(mut self, step: impl ReleaseStep + 'c) -> ReleaseResult<Self> {
    let previous = self.steps.last().map(|s| s.target()).unwrap_or(ReleaseState::Init);
    if step.target() <= previous || step.target() == ReleaseState::Done {
      return Err(
        WorkflowError::OutOfOrder {
          previous: previous.to_string(),
          next: step.target().to_string(),
        }
        .into(),
      );
    }

    self.steps.push(Box::new(step));
    Ok(self)
  }

  /// Run every step in order. Returns the final state, `Done` once `Verified` is reached.
  pub fn run(&mut self) -> ReleaseResult<ReleaseState> {
    for step in self.steps.iter_mut() {
      let target = step.target();

      if !step.is_enabled(self.ctx) {
        println!("⏭️  Skipping: {}", step.describe());
        tracing::debug!(state = %target, "step disabled");
        continue;
      }

      println!("\n▶ {}", step.describe());
      step.run(self.ctx, &mut self.record)?;

      match step.verify(self.ctx, &self.record)? {
        Postcondition::Holds => {
          tracing::info!(from = %self.state, to = %target, "release state advanced");
          self.state = target;
          println!("✅ {}", capitalize(&target.to_string()));
        }
        Postcondition::Violated(reason) => {
          return Err(
            WorkflowError::PostconditionFailed {
              state: target.to_string(),
              reason,
            }
            .into(),
          );
        }
      }
    }

    if self.state == ReleaseState::Verified {
      self.state = ReleaseState::Done;
    }
    Ok(self.state)
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}
