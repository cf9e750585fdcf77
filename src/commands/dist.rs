use crate::core::context::ReleaseContext;
use crate::core::error::ReleaseResult;
use crate::release::steps::{Build, Test};
use crate::release::workflow::Workflow;

/// Run the prep-python-dist command
pub fn run_prep_python_dist(ctx: &ReleaseContext) -> ReleaseResult<()> {
  prep_dist(ctx, "python")
}

/// Run the prep-node-dist command
pub fn run_prep_node_dist(ctx: &ReleaseContext) -> ReleaseResult<()> {
  prep_dist(ctx, "node")
}

fn prep_dist(ctx: &ReleaseContext, ecosystem: &'static str) -> ReleaseResult<()> {
  Workflow::new(ctx)
    .step(Build::new(Some(ecosystem)))?
    .step(Test::new(Some(ecosystem)))?
    .run()?;

  println!("\n📦 {} distribution ready", ecosystem);
  Ok(())
}
