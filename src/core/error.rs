//! Error types for release-helper with contextual messages and exit codes
//!
//! Every failure in the pipeline is fatal. The error taxonomy mirrors how an operator
//! remediates it: configuration problems, reconciliation mismatches, external tool
//! failures, and violated step postconditions.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for release-helper
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, markers, missing files)
  User = 1,
  /// System error (external command, I/O)
  System = 2,
  /// Validation failure (changelog reconciliation, postconditions)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for release-helper
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Changelog document marker errors
  Changelog(ChangelogError),

  /// Raw/final changelog entry reconciliation errors
  Verify(VerifyError),

  /// Distribution artifact errors
  Artifact(ArtifactError),

  /// Delegated command errors
  Command(CommandError),

  /// Workflow state machine errors
  Workflow(WorkflowError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Changelog(_) => ExitCode::User,
      ReleaseError::Artifact(_) => ExitCode::User,
      ReleaseError::Verify(_) => ExitCode::Validation,
      ReleaseError::Workflow(_) => ExitCode::Validation,
      ReleaseError::Command(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Changelog(e) => e.help_message(),
      ReleaseError::Verify(e) => e.help_message(),
      ReleaseError::Artifact(e) => e.help_message(),
      ReleaseError::Workflow(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Changelog(e) => write!(f, "{}", e),
      ReleaseError::Verify(e) => write!(f, "{}", e),
      ReleaseError::Artifact(e) => write!(f, "{}", e),
      ReleaseError::Command(e) => write!(f, "{}", e),
      ReleaseError::Workflow(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<ChangelogError> for ReleaseError {
  fn from(err: ChangelogError) -> Self {
    ReleaseError::Changelog(err)
  }
}

impl From<VerifyError> for ReleaseError {
  fn from(err: VerifyError) -> Self {
    ReleaseError::Verify(err)
  }
}

impl From<ArtifactError> for ReleaseError {
  fn from(err: ArtifactError) -> Self {
    ReleaseError::Artifact(err)
  }
}

impl From<CommandError> for ReleaseError {
  fn from(err: CommandError) -> Self {
    ReleaseError::Command(err)
  }
}

impl From<WorkflowError> for ReleaseError {
  fn from(err: WorkflowError) -> Self {
    ReleaseError::Workflow(err)
  }
}

impl From<toml_edit::TomlError> for ReleaseError {
  fn from(err: toml_edit::TomlError) -> Self {
    ReleaseError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid file pattern: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// A version-dependent step ran without a version spec
  NoVersionSpecified,

  /// No tag reachable from the branch, so there is no "since" boundary
  NoTagFound { branch: String },

  /// Version string without a leading major.minor.patch
  InvalidVersion { version: String },

  /// Neither a Python nor a Node manifest in the working directory
  ManifestNotFound { root: PathBuf },

  /// No version bump command given and none could be detected
  MissingVersionCommand,

  /// Malformed configuration value
  InvalidConfig { path: PathBuf, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::NoVersionSpecified => Some("Pass --version-spec or set VERSION_SPEC.".to_string()),
      ConfigError::NoTagFound { branch } => Some(format!(
        "Fetch tags first (`git fetch <remote> {} --tags`) or create an initial release tag.",
        branch
      )),
      ConfigError::ManifestNotFound { .. } => {
        Some("Run from the package root (setup.py, pyproject.toml, or package.json).".to_string())
      }
      ConfigError::MissingVersionCommand => Some(
        "Pass --version-cmd (or VERSION_CMD), or add a tbump.toml / bumpversion config to the project.".to_string(),
      ),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::NoVersionSpecified => write!(f, "No new version specified"),
      ConfigError::NoTagFound { branch } => write!(f, "No tags found on branch {}", branch),
      ConfigError::InvalidVersion { version } => {
        write!(f, "Version '{}' does not start with major.minor.patch", version)
      }
      ConfigError::ManifestNotFound { root } => {
        write!(f, "No package manifest found in {}", root.display())
      }
      ConfigError::MissingVersionCommand => write!(f, "Please specify a version bump command to run"),
      ConfigError::InvalidConfig { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
    }
  }
}

/// Changelog insertion marker errors
#[derive(Debug)]
pub enum ChangelogError {
  /// Marker (or the adjacent empty marker pair) is absent
  MissingMarker { marker: String },

  /// Marker occurs more than once in the document
  DuplicateMarker { marker: String, count: usize },

  /// END marker precedes START marker
  MarkersOutOfOrder,
}

impl ChangelogError {
  fn help_message(&self) -> Option<String> {
    match self {
      ChangelogError::MissingMarker { .. } | ChangelogError::MarkersOutOfOrder => Some(format!(
        "The changelog needs an empty insertion point:\n{}\n{}",
        crate::changelog::document::START_MARKER,
        crate::changelog::document::END_MARKER
      )),
      ChangelogError::DuplicateMarker { .. } => {
        Some("Remove the extra marker so the changelog has exactly one insertion point.".to_string())
      }
    }
  }
}

impl fmt::Display for ChangelogError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ChangelogError::MissingMarker { marker } => {
        write!(f, "Missing changelog marker: {}", marker)
      }
      ChangelogError::DuplicateMarker { marker, count } => {
        write!(f, "Changelog marker appears {} times (expected once): {}", count, marker)
      }
      ChangelogError::MarkersOutOfOrder => write!(f, "Changelog end marker precedes the start marker"),
    }
  }
}

/// Reconciliation errors between the final (edited) and raw (synthesized) entries
#[derive(Debug, PartialEq, Eq)]
pub enum VerifyError {
  /// Final entry lacks the version heading
  MissingVersionHeading { version: String },

  /// Raw entry references a PR the final entry dropped
  MissingPullRequest { number: u64 },

  /// Final entry references a PR outside this release window
  ForeignPullRequest { number: u64, version: String },
}

impl VerifyError {
  fn help_message(&self) -> Option<String> {
    match self {
      VerifyError::MissingVersionHeading { version } => {
        Some(format!("The entry between the markers must contain a `# {}` heading.", version))
      }
      VerifyError::MissingPullRequest { number } => Some(format!(
        "Titles may be edited, but every PR must stay referenced as [#{}].",
        number
      )),
      VerifyError::ForeignPullRequest { number, .. } => Some(format!(
        "Remove [#{}]; it was not merged since the last release tag.",
        number
      )),
    }
  }
}

impl fmt::Display for VerifyError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      VerifyError::MissingVersionHeading { version } => write!(f, "Did not find entry for {}", version),
      VerifyError::MissingPullRequest { number } => write!(f, "Missing PR #{} in the changelog", number),
      VerifyError::ForeignPullRequest { number, version } => {
        write!(f, "PR #{} does not belong in the changelog for {}", number, version)
      }
    }
  }
}

/// Distribution artifact errors
#[derive(Debug)]
pub enum ArtifactError {
  /// Artifact count differs from the ecosystem's expectation
  Missing {
    expected: usize,
    found: usize,
    location: PathBuf,
  },
}

impl ArtifactError {
  fn help_message(&self) -> Option<String> {
    match self {
      ArtifactError::Missing { .. } => Some("Build the distribution first (prep-python-dist).".to_string()),
    }
  }
}

impl fmt::Display for ArtifactError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ArtifactError::Missing {
        expected,
        found,
        location,
      } => write!(
        f,
        "Missing distribution files: expected {} in {}, found {}",
        expected,
        location.display(),
        found
      ),
    }
  }
}

/// Delegated command errors
#[derive(Debug)]
pub enum CommandError {
  /// Command exited non-zero
  Failed {
    command: String,
    status: i32,
    stderr: String,
  },

  /// Command could not be started
  Spawn { command: String, reason: String },

  /// Command line could not be split into arguments
  InvalidCommandLine { line: String },
}

impl fmt::Display for CommandError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      CommandError::Failed { command, status, stderr } => {
        write!(f, "Command failed (exit {}): {}\n{}", status, command, stderr)
      }
      CommandError::Spawn { command, reason } => write!(f, "Failed to run {}: {}", command, reason),
      CommandError::InvalidCommandLine { line } => write!(f, "Could not parse command line: {}", line),
    }
  }
}

/// Workflow state machine errors
#[derive(Debug)]
pub enum WorkflowError {
  /// A step ran but its observable effect is missing
  PostconditionFailed { state: String, reason: String },

  /// Steps were assembled out of the fixed state order
  OutOfOrder { previous: String, next: String },
}

impl WorkflowError {
  fn help_message(&self) -> Option<String> {
    match self {
      WorkflowError::PostconditionFailed { .. } => Some(
        "The working tree is left as-is. Fix the cause, reset to a clean checkout, and re-run.".to_string(),
      ),
      WorkflowError::OutOfOrder { .. } => None,
    }
  }
}

impl fmt::Display for WorkflowError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      WorkflowError::PostconditionFailed { state, reason } => {
        write!(f, "Step '{}' did not take effect: {}", state, reason)
      }
      WorkflowError::OutOfOrder { previous, next } => {
        write!(f, "Release step '{}' cannot follow '{}'", next, previous)
      }
    }
  }
}

/// Result type alias for release-helper
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
