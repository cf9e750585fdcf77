use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::steps::BumpVersion;
use crate::release::workflow::Workflow;

/// Run the bump-version command
pub fn run_bump_version(ctx: &ReleaseContext) -> ReleaseResult<()> {
  let spec = ctx.settings.require_version_spec()?.to_string();

  Workflow::new(ctx).step(BumpVersion::release(Some(spec)))?.run()?;

  println!("\n📌 Version is now {}", ctx.current_version()?);
  Ok(())
}
