use super::print_publish_instructions;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::steps::{
  Build, BumpVersion, CreateCommit, PrepareChangelog, Tag, Test, VerifyChangelog, VerifyRelease,
};
use crate::release::workflow::Workflow;
use std::path::PathBuf;

/// Run the release command: every state from Init to Done
pub fn run_release(ctx: &ReleaseContext, output: Option<PathBuf>) -> ReleaseResult<()> {
  let spec = ctx.settings.require_version_spec()?.to_string();

  let state = Workflow::new(ctx)
    .step(BumpVersion::release(Some(spec)))?
    .step(PrepareChangelog::new(false))?
    .step(VerifyChangelog::new(output))?
    .step(Build::new(None))?
    .step(Test::new(None))?
    .step(CreateCommit::new())?
    .step(Tag)?
    .step(BumpVersion::post_release(ctx.settings.post_version_spec.clone()))?
    .step(VerifyRelease::new())?
    .run()?;

  tracing::info!(state = %state, "release pipeline finished");
  print_publish_instructions(ctx);
  Ok(())
}
