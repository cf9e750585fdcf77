mod activity;
mod adapters;
mod changelog;
mod commands;
mod core;
mod release;
mod utils;

use activity::GithubActivity;
use clap::{Args, Parser, Subcommand};
use core::config::{FileConfig, ReleaseSettings, SettingsOverrides};
use core::context::ReleaseContext;
use core::error::{ReleaseError, print_error};
use core::runner::SystemRunner;
use release::env::CiEnvironment;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Prepare releases: bump, verified changelog entry, artifact digests, annotated tag
#[derive(Parser)]
#[command(name = "release-helper")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  // ============================================================================
  // Preparation
  // ============================================================================
  /// Bump the package version with the configured bump tool
  BumpVersion {
    #[command(flatten)]
    version: VersionArgs,
  },

  /// Resolve version/branch/repository for CI and export them to GITHUB_ENV
  PrepEnv {
    #[command(flatten)]
    repo: RepoArgs,
    #[command(flatten)]
    version: VersionArgs,
  },

  // ============================================================================
  // Changelog
  // ============================================================================
  /// Inject a changelog entry for the current version
  PrepChangelog {
    #[command(flatten)]
    repo: RepoArgs,
    #[command(flatten)]
    changelog: ChangelogArgs,
  },

  /// Reconcile the edited changelog entry and reset the insertion point
  ExtractChangelog {
    #[command(flatten)]
    repo: RepoArgs,
    #[command(flatten)]
    changelog: ChangelogArgs,
    /// Write the final entry to this file
    #[arg(long, env = "CHANGELOG_OUTPUT")]
    output: Option<PathBuf>,
  },

  // ============================================================================
  // Distributions
  // ============================================================================
  /// Build the Python sdist and wheel and smoke-test them in fresh virtualenvs
  PrepPythonDist {
    #[command(flatten)]
    test: TestArgs,
  },

  /// Check the npm package and smoke-test the packed tarball
  PrepNodeDist {
    #[command(flatten)]
    test: TestArgs,
  },

  // ============================================================================
  // Publishing
  // ============================================================================
  /// Commit artifact digests on a release branch, tag, and optionally bump again
  FinalizeRelease {
    #[command(flatten)]
    repo: RepoArgs,
    #[command(flatten)]
    post: PostReleaseArgs,
    /// Version bump command for the post-release bump
    #[arg(long, env = "VERSION_CMD")]
    version_cmd: Option<String>,
  },

  /// Run the whole pipeline: bump, changelog, build, test, commit, tag, verify
  Release {
    #[command(flatten)]
    repo: RepoArgs,
    #[command(flatten)]
    version: VersionArgs,
    #[command(flatten)]
    changelog: ChangelogArgs,
    #[command(flatten)]
    test: TestArgs,
    #[command(flatten)]
    post: PostReleaseArgs,
    /// Write the final changelog entry to this file
    #[arg(long, env = "CHANGELOG_OUTPUT")]
    output: Option<PathBuf>,
  },

  /// Print the final version (pre-release and dev suffixes removed)
  FinalVersion {
    /// Version string, e.g. 1.2.0rc1
    #[arg(id = "version_string", value_name = "VERSION")]
    version: String,
  },
}

/// Where the release is cut from
#[derive(Args)]
struct RepoArgs {
  /// Target branch (default: CI branch, else the current branch)
  #[arg(long, env = "BRANCH")]
  branch: Option<String>,
  /// Git remote name
  #[arg(long, env = "REMOTE")]
  remote: Option<String>,
  /// GitHub repository as org/name (default: derived from the remote URL)
  #[arg(long, env = "REPOSITORY")]
  repo: Option<String>,
  /// GitHub token for activity and pull request lookups
  #[arg(long, env = "GITHUB_ACCESS_TOKEN", hide_env_values = true)]
  auth: Option<String>,
  /// Command producing the Markdown activity report
  #[arg(long, env = "ACTIVITY_CMD")]
  activity_cmd: Option<String>,
}

#[derive(Args)]
struct ChangelogArgs {
  /// Changelog file
  #[arg(long = "path", env = "CHANGELOG")]
  changelog: Option<PathBuf>,
  /// Replace bot-authored backport lines with the original pull requests
  #[arg(long, env = "RESOLVE_BACKPORTS", num_args = 0..=1, default_missing_value = "true")]
  resolve_backports: Option<bool>,
}

#[derive(Args)]
struct VersionArgs {
  /// New version or bump part (e.g. 1.2.0, patch, minor)
  #[arg(long, env = "VERSION_SPEC")]
  version_spec: Option<String>,
  /// Version bump command (default: detected from bumpversion/tbump config)
  #[arg(long, env = "VERSION_CMD")]
  version_cmd: Option<String>,
}

#[derive(Args)]
struct TestArgs {
  /// Smoke-test command run against the installed package
  #[arg(long, env = "PY_TEST_CMD")]
  test_cmd: Option<String>,
}

#[derive(Args)]
struct PostReleaseArgs {
  /// Version to bump to after tagging (next development version)
  #[arg(long, env = "POST_VERSION_SPEC")]
  post_version_spec: Option<String>,
}

impl RepoArgs {
  fn apply(self, overrides: &mut SettingsOverrides) {
    overrides.branch = self.branch;
    overrides.remote = self.remote;
    overrides.repository = self.repo;
    overrides.auth = self.auth;
    overrides.activity_cmd = self.activity_cmd;
  }
}

impl ChangelogArgs {
  fn apply(self, overrides: &mut SettingsOverrides) {
    overrides.changelog = self.changelog;
    overrides.resolve_backports = self.resolve_backports;
  }
}

impl VersionArgs {
  fn apply(self, overrides: &mut SettingsOverrides) {
    overrides.version_spec = self.version_spec;
    overrides.version_cmd = self.version_cmd;
  }
}

impl TestArgs {
  fn apply(self, overrides: &mut SettingsOverrides) {
    overrides.test_cmd = self.test_cmd;
  }
}

impl PostReleaseArgs {
  fn apply(self, overrides: &mut SettingsOverrides) {
    overrides.post_version_spec = self.post_version_spec;
  }
}

/// What to run once settings are merged
enum Action {
  BumpVersion,
  PrepEnv,
  PrepChangelog,
  ExtractChangelog(Option<PathBuf>),
  PrepPythonDist,
  PrepNodeDist,
  FinalizeRelease,
  Release(Option<PathBuf>),
  FinalVersion(String),
}

impl Commands {
  fn into_action(self) -> (Action, SettingsOverrides) {
    let mut overrides = SettingsOverrides::default();

    let action = match self {
      Commands::BumpVersion { version } => {
        version.apply(&mut overrides);
        Action::BumpVersion
      }
      Commands::PrepEnv { repo, version } => {
        repo.apply(&mut overrides);
        version.apply(&mut overrides);
        Action::PrepEnv
      }
      Commands::PrepChangelog { repo, changelog } => {
        repo.apply(&mut overrides);
        changelog.apply(&mut overrides);
        Action::PrepChangelog
      }
      Commands::ExtractChangelog { repo, changelog, output } => {
        repo.apply(&mut overrides);
        changelog.apply(&mut overrides);
        Action::ExtractChangelog(output)
      }
      Commands::PrepPythonDist { test } => {
        test.apply(&mut overrides);
        Action::PrepPythonDist
      }
      Commands::PrepNodeDist { test } => {
        test.apply(&mut overrides);
        Action::PrepNodeDist
      }
      Commands::FinalizeRelease {
        repo,
        post,
        version_cmd,
      } => {
        repo.apply(&mut overrides);
        post.apply(&mut overrides);
        overrides.version_cmd = version_cmd;
        Action::FinalizeRelease
      }
      Commands::Release {
        repo,
        version,
        changelog,
        test,
        post,
        output,
      } => {
        repo.apply(&mut overrides);
        version.apply(&mut overrides);
        changelog.apply(&mut overrides);
        test.apply(&mut overrides);
        post.apply(&mut overrides);
        Action::Release(output)
      }
      Commands::FinalVersion { version } => Action::FinalVersion(version),
    };

    (action, overrides)
  }
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

/// Diagnostics go to stderr, filtered by RUST_LOG (default: warn)
fn init_logging() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

  tracing_subscriber::registry()
    .with(filter)
    .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
    .init();
}

fn main() {
  let cli = Cli::parse();
  init_logging();

  let (action, overrides) = cli.command.into_action();

  // Needs neither a package nor a repository
  if let Action::FinalVersion(version) = &action {
    if let Err(err) = commands::run_final_version(version) {
      handle_error(err);
    }
    return;
  }

  let package_root = match std::env::current_dir() {
    Ok(dir) => dir,
    Err(e) => {
      eprintln!("Error: Failed to get current directory: {}", e);
      std::process::exit(1);
    }
  };

  let file_config = match FileConfig::load(&package_root) {
    Ok(config) => config,
    Err(e) => handle_error(e),
  };
  let settings = ReleaseSettings::resolve(file_config, overrides);
  tracing::debug!(
    remote = %settings.remote,
    branch = ?settings.branch,
    changelog = %settings.changelog.display(),
    "settings resolved"
  );

  let runner = SystemRunner::new(&package_root);
  let activity = GithubActivity::new(&runner, &settings.activity_cmd, settings.auth.clone());
  let ctx = ReleaseContext::new(&package_root, &runner, &activity, settings);

  let result = match action {
    Action::BumpVersion => commands::run_bump_version(&ctx),
    Action::PrepEnv => commands::run_prep_env(&ctx, &CiEnvironment::from_env()),
    Action::PrepChangelog => commands::run_prep_changelog(&ctx),
    Action::ExtractChangelog(output) => commands::run_extract_changelog(&ctx, output),
    Action::PrepPythonDist => commands::run_prep_python_dist(&ctx),
    Action::PrepNodeDist => commands::run_prep_node_dist(&ctx),
    Action::FinalizeRelease => commands::run_finalize_release(&ctx),
    Action::Release(output) => commands::run_release(&ctx, output),
    Action::FinalVersion(version) => commands::run_final_version(&version),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
