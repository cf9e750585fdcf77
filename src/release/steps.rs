//! Concrete release steps
//!
//! Each step delegates the real work (bump tool, git, package tooling, activity
//! lookups) through the context's seams and checks an observable effect afterwards.

use super::commit::{ReleaseCommit, collect_digests};
use super::version::ReleaseVersion;
use super::workflow::{Postcondition, ReleaseRecord, ReleaseState, ReleaseStep};
use crate::adapters;
use crate::changelog::{BackportResolver, BotIdentities, EntrySynthesizer, document, verify_entry};
use crate::core::context::ReleaseContext;
use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::core::runner::CommandSpec;
use crate::utils::is_same_local_repo;
use std::collections::BTreeSet;
use std::fs;
use std::path::PathBuf;

/// Name of the local branch the release commit is made on
pub const RELEASE_BRANCH: &str = "release";

/// Run the version bump tool with `spec`
pub fn bump_version(ctx: &ReleaseContext, spec: &str) -> ReleaseResult<()> {
  let cmd = match &ctx.settings.version_cmd {
    Some(cmd) => cmd.clone(),
    None => adapters::detect_version_cmd(&ctx.root)?,
  };

  ctx.runner.run(&CommandSpec::parse(&cmd)?.arg(spec))?;
  Ok(())
}

/// Fresh entry for `version` from activity since the branch's latest tag
pub fn synthesize_entry(ctx: &ReleaseContext, version: &ReleaseVersion) -> ReleaseResult<String> {
  let git = ctx.git();
  let mut synthesizer = EntrySynthesizer::new(&git, ctx.activity);
  if ctx.settings.resolve_backports {
    let bots = BotIdentities::new(ctx.settings.bots.iter().cloned());
    synthesizer = synthesizer.with_backports(BackportResolver::new(bots));
  }

  synthesizer.synthesize(&ctx.target_ref()?, &ctx.repository()?, version.as_str())
}

/// VersionBumped and PostBumped: run the bump tool, then confirm the manifest changed
pub struct BumpVersion {
  target: ReleaseState,
  spec: Option<String>,
  before: Option<ReleaseVersion>,
}

impl BumpVersion {
  pub fn release(spec: Option<String>) -> Self {
    Self {
      target: ReleaseState::VersionBumped,
      spec,
      before: None,
    }
  }

  /// Bump to the next development version and commit it; skipped without a spec
  pub fn post_release(spec: Option<String>) -> Self {
    Self {
      target: ReleaseState::PostBumped,
      spec,
      before: None,
    }
  }
}

impl ReleaseStep for BumpVersion {
  fn target(&self) -> ReleaseState {
    self.target
  }

  fn describe(&self) -> String {
    match (&self.target, &self.spec) {
      (ReleaseState::PostBumped, Some(spec)) => format!("Bumping to post-release version ({})", spec),
      (ReleaseState::PostBumped, None) => "Post-release version bump".to_string(),
      (_, Some(spec)) => format!("Bumping version ({})", spec),
      (_, None) => "Bumping version".to_string(),
    }
  }

  fn is_enabled(&self, _ctx: &ReleaseContext) -> bool {
    self.target != ReleaseState::PostBumped || self.spec.is_some()
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let spec = self.spec.as_deref().ok_or(ConfigError::NoVersionSpecified)?;
    self.before = Some(ctx.current_version()?);

    bump_version(ctx, spec)?;

    if self.target == ReleaseState::PostBumped {
      let post_version = ctx.current_version()?;
      println!("   Bumped version to {}", post_version);
      ctx.git().commit_all(&[format!("Bump to {}", post_version)])?;
    }
    Ok(())
  }

  fn verify(&self, ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    let after = ctx.current_version()?;
    let Some(before) = &self.before else {
      return Ok(Postcondition::Violated("version was not read before bumping".to_string()));
    };

    if after.base() < before.base() {
      tracing::warn!(from = %before, to = %after, "version bump moved backwards");
    }

    Ok(Postcondition::check(after != *before, || {
      format!("version is still {}", before)
    }))
  }
}

/// ChangelogPrepared: synthesize the entry and inject it into the changelog
pub struct PrepareChangelog {
  discard_changes: bool,
  modified_before: BTreeSet<String>,
  version: Option<ReleaseVersion>,
}

impl PrepareChangelog {
  /// `discard_changes` resets the working tree first (`git checkout .`), so the
  /// changelog ends up the only modified file
  pub fn new(discard_changes: bool) -> Self {
    Self {
      discard_changes,
      modified_before: BTreeSet::new(),
      version: None,
    }
  }
}

impl ReleaseStep for PrepareChangelog {
  fn target(&self) -> ReleaseState {
    ReleaseState::ChangelogPrepared
  }

  fn describe(&self) -> String {
    "Preparing changelog entry".to_string()
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let git = ctx.git();
    let branch = ctx.branch()?;
    git.fetch(&ctx.settings.remote, &branch, false)?;

    // Version is read before the checkout so an uncommitted bump still names the entry
    let version = ctx.current_version()?;
    if self.discard_changes {
      git.discard_changes()?;
    }
    self.modified_before = git.modified_files()?.into_iter().collect();

    let changelog = ctx.changelog_git_path();
    if self.modified_before.contains(&changelog) {
      return Err(ReleaseError::with_help(
        format!("{} already has uncommitted changes", changelog),
        "Commit or discard them before preparing the changelog.",
      ));
    }

    let path = ctx.changelog_path();
    let current = document::read(&path)?;
    document::check_insertion_point(&current).with_context(|| format!("in {}", path.display()))?;

    let entry = synthesize_entry(ctx, &version)?;
    document::write(&path, &document::inject(&current, &entry)?)?;

    self.version = Some(version);
    Ok(())
  }

  fn verify(&self, ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    let git = ctx.git();
    let changelog = ctx.changelog_git_path();

    let modified_after: BTreeSet<String> = git.modified_files()?.into_iter().collect();
    let touched: BTreeSet<String> = modified_after.difference(&self.modified_before).cloned().collect();

    if touched.len() != 1 || !touched.contains(&changelog) {
      return Ok(Postcondition::Violated(format!(
        "expected only {} to change, found: {}",
        changelog,
        touched.into_iter().collect::<Vec<_>>().join(", ")
      )));
    }

    let heading = match &self.version {
      Some(version) => format!("# {}", version),
      None => return Ok(Postcondition::Violated("no version was prepared".to_string())),
    };
    let diff = git.diff()?;
    Ok(Postcondition::check(diff.contains(&heading), || {
      format!("'{}' does not appear in the working tree diff", heading)
    }))
  }
}

/// ChangelogVerified: reconcile the edited entry with fresh activity, then reset the markers
pub struct VerifyChangelog {
  output: Option<PathBuf>,
}

impl VerifyChangelog {
  /// `output` receives the final entry text when given
  pub fn new(output: Option<PathBuf>) -> Self {
    Self { output }
  }
}

impl ReleaseStep for VerifyChangelog {
  fn target(&self) -> ReleaseState {
    ReleaseState::ChangelogVerified
  }

  fn describe(&self) -> String {
    "Verifying changelog entry".to_string()
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let version = ctx.current_version()?;
    let path = ctx.changelog_path();
    let extracted = document::extract(&document::read(&path)?)?;

    let raw_entry = synthesize_entry(ctx, &version)?;
    verify_entry(&extracted.entry, &raw_entry, version.as_str())?;

    if let Some(output) = &self.output {
      fs::write(output, &extracted.entry).with_context(|| format!("Failed to write {}", output.display()))?;
      println!("   Wrote changelog entry to {}", output.display());
    }

    document::write(&path, &extracted.document)
  }

  fn verify(&self, ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    let current = document::read(&ctx.changelog_path())?;
    Ok(match document::check_insertion_point(&current) {
      Ok(()) => Postcondition::Holds,
      Err(err) => Postcondition::Violated(format!("insertion point not reset: {}", err)),
    })
  }
}

/// Built: ecosystem build and metadata checks
pub struct Build {
  ecosystem: Option<&'static str>,
}

impl Build {
  /// `ecosystem` restricts the build to one manifest kind (`python`, `node`)
  pub fn new(ecosystem: Option<&'static str>) -> Self {
    Self { ecosystem }
  }
}

impl ReleaseStep for Build {
  fn target(&self) -> ReleaseState {
    ReleaseState::Built
  }

  fn describe(&self) -> String {
    format!("Building {} distribution", self.ecosystem.unwrap_or("package"))
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    for manifest in ctx.manifests_for(self.ecosystem)? {
      println!("📦 {}", manifest.ecosystem());
      manifest.build(ctx.runner, &ctx.settings)?;
    }
    Ok(())
  }

  /// Tool exit status is the only check
  fn verify(&self, _ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    Ok(Postcondition::Holds)
  }
}

/// Tested: install the built distribution in isolation and smoke-test it
pub struct Test {
  ecosystem: Option<&'static str>,
}

impl Test {
  pub fn new(ecosystem: Option<&'static str>) -> Self {
    Self { ecosystem }
  }
}

impl ReleaseStep for Test {
  fn target(&self) -> ReleaseState {
    ReleaseState::Tested
  }

  fn describe(&self) -> String {
    format!("Testing {} distribution", self.ecosystem.unwrap_or("package"))
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    for manifest in ctx.manifests_for(self.ecosystem)? {
      manifest.test(ctx.runner, &ctx.settings)?;
    }
    Ok(())
  }

  fn verify(&self, _ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    Ok(Postcondition::Holds)
  }
}

/// CommitCreated: commit with the artifact digests on a `release` branch cut from the target
pub struct CreateCommit {
  subject: Option<String>,
}

impl CreateCommit {
  pub fn new() -> Self {
    Self { subject: None }
  }
}

impl Default for CreateCommit {
  fn default() -> Self {
    Self::new()
  }
}

impl ReleaseStep for CreateCommit {
  fn target(&self) -> ReleaseState {
    ReleaseState::CommitCreated
  }

  fn describe(&self) -> String {
    "Creating release commit".to_string()
  }

  fn run(&mut self, ctx: &ReleaseContext, record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let git = ctx.git();
    let version = ctx.current_version()?;

    git.checkout_new_branch(RELEASE_BRANCH, &ctx.target_ref()?)?;

    println!("🔐 SHA256 hashes:");
    let digests = collect_digests(&ctx.root, &ctx.manifests, ctx.runner, &ctx.settings)?;
    let commit = ReleaseCommit::new(version.as_str(), digests);
    git.commit_all(&commit.messages())?;

    self.subject = Some(commit.subject());
    record.version = Some(version);
    Ok(())
  }

  fn verify(&self, ctx: &ReleaseContext, _record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    let head = ctx.git().head_subject()?;
    Ok(Postcondition::check(self.subject.as_deref() == Some(head.as_str()), || {
      format!("HEAD is '{}'", head)
    }))
  }
}

/// Tagged: annotated `v{version}` tag on the release commit
pub struct Tag;

impl ReleaseStep for Tag {
  fn target(&self) -> ReleaseState {
    ReleaseState::Tagged
  }

  fn describe(&self) -> String {
    "Tagging release".to_string()
  }

  fn run(&mut self, ctx: &ReleaseContext, record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let version = record.release_version(ctx)?;
    let tag = version.tag_name();

    ctx.git().create_annotated_tag(&tag, &format!("Release {}", tag))?;

    record.version = Some(version);
    record.tag = Some(tag);
    Ok(())
  }

  fn verify(&self, ctx: &ReleaseContext, record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    let Some(tag) = &record.tag else {
      return Ok(Postcondition::Violated("no tag was created".to_string()));
    };

    let tags = ctx.git().tags()?;
    Ok(Postcondition::check(tags.contains(tag), || {
      format!("{} is not in the tag list", tag)
    }))
  }
}

/// Verified: the release branch must differ from the target by the release version
pub struct VerifyRelease {
  diff: String,
  local_remote: bool,
}

impl VerifyRelease {
  pub fn new() -> Self {
    Self {
      diff: String::new(),
      local_remote: false,
    }
  }
}

impl Default for VerifyRelease {
  fn default() -> Self {
    Self::new()
  }
}

impl ReleaseStep for VerifyRelease {
  fn target(&self) -> ReleaseState {
    ReleaseState::Verified
  }

  fn describe(&self) -> String {
    "Verifying release commits".to_string()
  }

  fn run(&mut self, ctx: &ReleaseContext, _record: &mut ReleaseRecord) -> ReleaseResult<()> {
    let git = ctx.git();
    self.diff = git.diff_against(&ctx.target_ref()?)?;

    let url = git.remote_url(&ctx.settings.remote)?;
    self.local_remote = is_same_local_repo(&url, &ctx.root);
    Ok(())
  }

  fn verify(&self, ctx: &ReleaseContext, record: &ReleaseRecord) -> ReleaseResult<Postcondition> {
    if self.local_remote {
      tracing::info!("remote is the working repository itself, skipping diff check");
      return Ok(Postcondition::Holds);
    }

    let version = record.release_version(ctx)?;
    Ok(Postcondition::check(self.diff.contains(version.as_str()), || {
      format!("release version {} does not appear in the diff against the target branch", version)
    }))
  }
}
