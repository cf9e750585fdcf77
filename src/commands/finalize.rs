use super::print_publish_instructions;
use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::steps::{BumpVersion, CreateCommit, Tag, VerifyRelease};
use crate::release::workflow::Workflow;

/// Run the finalize-release command
///
/// Expects built distributables (prep-python-dist / prep-node-dist). Cuts a
/// `release` branch from `remote/branch`, commits the artifact digests, tags,
/// optionally bumps to the next development version, then checks the result.
pub fn run_finalize_release(ctx: &ReleaseContext) -> ReleaseResult<()> {
  Workflow::new(ctx)
    .step(CreateCommit::new())?
    .step(Tag)?
    .step(BumpVersion::post_release(ctx.settings.post_version_spec.clone()))?
    .step(VerifyRelease::new())?
    .run()?;

  print_publish_instructions(ctx);
  Ok(())
}
