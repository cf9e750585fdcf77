//! prep-env command
//!
//! Resolves the release coordinates (version, branch, repository) for a CI run,
//! makes sure the remote exists and is fetched, and exports the values for later
//! workflow steps.

use crate::core::context::ReleaseContext;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::release::env::{BOT_EMAIL, BOT_NAME, CiEnvironment, EnvReport};
use crate::release::steps::BumpVersion;
use crate::release::workflow::Workflow;

/// Run the prep-env command
pub fn run_prep_env(ctx: &ReleaseContext, ci: &CiEnvironment) -> ReleaseResult<()> {
  let git = ctx.git();

  if let Some(spec) = &ctx.settings.version_spec {
    Workflow::new(ctx).step(BumpVersion::release(Some(spec.clone())))?.run()?;
  }

  let version = ctx.current_version()?;
  println!("version={}", version);

  let branch = match ctx.settings.branch.clone().or_else(|| ci.branch()) {
    Some(branch) => branch,
    None => git.current_branch()?,
  };
  println!("branch={}", branch);

  let mut repository = ctx.settings.repository.clone();
  if ci.github_actions {
    git.set_global_config("user.email", BOT_EMAIL)?;
    git.set_global_config("user.name", BOT_NAME)?;

    let repo = match repository.take() {
      Some(repo) => repo,
      None => {
        let current = ci.repository.as_deref().ok_or_else(|| {
          ReleaseError::with_help(
            "GITHUB_REPOSITORY is not set",
            "Pass --repo (or set REPOSITORY) as org/name.",
          )
        })?;
        ctx.activity.source_repository(current)?
      }
    };

    git.add_remote(&ctx.settings.remote, &format!("https://github.com/{}", repo))?;
    repository = Some(repo);
  }

  let repository = match repository {
    Some(repo) => repo,
    None => ctx.repository()?,
  };

  git.fetch(&ctx.settings.remote, &branch, true)?;

  let report = EnvReport {
    branch,
    version,
    repository,
  };
  println!("repo={}", report.repository);
  println!("is_prerelease={}", report.version.is_prerelease());

  if let Some(path) = &ci.env_file {
    report.append_to(path)?;
    println!("Wrote env variables to GITHUB_ENV file");
  }

  Ok(())
}
