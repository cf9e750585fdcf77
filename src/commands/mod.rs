//! CLI commands for release-helper
//!
//! Each command maps onto a slice of the release state machine:
//!
//! ## Preparation
//! - **bump**: run the version bump tool (`bump-version`)
//! - **env**: resolve branch/version/repository for CI and export them (`prep-env`)
//!
//! ## Changelog
//! - **changelog**: inject a fresh entry (`prep-changelog`) and reconcile the edited
//!   entry before release (`extract-changelog`)
//!
//! ## Distributions
//! - **dist**: build and smoke-test Python or npm packages (`prep-python-dist`, `prep-node-dist`)
//!
//! ## Publishing
//! - **finalize**: release commit with artifact digests, tag, post-release bump (`finalize-release`)
//! - **release**: the whole pipeline in one run (`release`)
//! - **version**: print the final version of a version string (`final-version`)
//!
//! All commands except `final-version` accept `&ReleaseContext`.

pub mod bump;
pub mod changelog;
pub mod dist;
pub mod env;
pub mod finalize;
pub mod release;
pub mod version;

pub use bump::run_bump_version;
pub use changelog::{run_extract_changelog, run_prep_changelog};
pub use dist::{run_prep_node_dist, run_prep_python_dist};
pub use env::run_prep_env;
pub use finalize::run_finalize_release;
pub use release::run_release;
pub use version::run_final_version;

use crate::core::context::ReleaseContext;

/// Follow-up instructions printed after the release commit and tag exist
fn print_publish_instructions(ctx: &ReleaseContext) {
  println!("\n🎉 Release Prep Complete!");
  println!("\n📋 Next steps:");
  for manifest in &ctx.manifests {
    match manifest.ecosystem() {
      "python" => println!("   - Push to PyPI with `twine upload dist/*`"),
      "node" => println!("   - Push to npm with `npm publish`"),
      _ => {}
    }
  }
  println!("   - Push changes with `git push {} release --tags`", ctx.settings.remote);
  println!("   - Make a GitHub release");
}
