//! Changelog commands
//!
//! `prep-changelog` produces a pull request that only touches the changelog, so
//! it starts from a clean working tree. `extract-changelog` runs at release time,
//! after maintainers have edited the entry by hand.

use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::steps::{PrepareChangelog, VerifyChangelog};
use crate::release::workflow::Workflow;
use std::path::PathBuf;

/// Run the prep-changelog command
pub fn run_prep_changelog(ctx: &ReleaseContext) -> ReleaseResult<()> {
  Workflow::new(ctx).step(PrepareChangelog::new(true))?.run()?;

  println!("\n📝 Changelog Prep Complete!");
  println!("   Create a PR for the Changelog change");
  Ok(())
}

/// Run the extract-changelog command
pub fn run_extract_changelog(ctx: &ReleaseContext, output: Option<PathBuf>) -> ReleaseResult<()> {
  Workflow::new(ctx).step(VerifyChangelog::new(output))?.run()?;

  println!("\n📝 Changelog entry for {} verified", ctx.current_version()?);
  Ok(())
}
