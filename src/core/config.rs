use crate::core::error::{ConfigError, ReleaseResult, ResultExt};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_REMOTE: &str = "upstream";
pub const DEFAULT_CHANGELOG: &str = "CHANGELOG.md";
pub const DEFAULT_ACTIVITY_CMD: &str = "github-activity";
pub const DEFAULT_BOTS: &[&str] = &["meeseeksmachine"];
pub const DEFAULT_DIST_COUNT: usize = 2;

/// Optional project configuration for release-helper
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// # Example
///
/// ```toml
/// [git]
/// remote = "origin"
///
/// [changelog]
/// path = "docs/CHANGELOG.md"
/// bots = ["meeseeksmachine", "backport-bot"]
/// resolve_backports = true
///
/// [build]
/// version_cmd = "tbump --non-interactive --only-patch"
/// test_cmd = "pytest --pyargs mypkg"
/// dist_count = 2
///
/// [activity]
/// command = "github-activity"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
  #[serde(default)]
  pub git: GitConfig,
  #[serde(default)]
  pub changelog: ChangelogConfig,
  #[serde(default)]
  pub build: BuildConfig,
  #[serde(default)]
  pub activity: ActivityConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitConfig {
  pub remote: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChangelogConfig {
  pub path: Option<PathBuf>,
  /// Accounts whose PRs are backports of another PR
  pub bots: Option<Vec<String>>,
  pub resolve_backports: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildConfig {
  pub version_cmd: Option<String>,
  pub test_cmd: Option<String>,
  /// Expected number of Python dist files
  pub dist_count: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActivityConfig {
  /// Command that renders merged-PR activity as Markdown
  pub command: Option<String>,
}

impl FileConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config if one exists. A missing file is not an error; a malformed one is.
  pub fn load(path: &Path) -> ReleaseResult<Option<Self>> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(None);
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content, &config_path)?;

    tracing::debug!(path = %config_path.display(), "loaded release config");
    Ok(Some(config))
  }

  fn parse(content: &str, path: &Path) -> ReleaseResult<Self> {
    let config: FileConfig = toml_edit::de::from_str(content).map_err(|e| ConfigError::InvalidConfig {
      path: path.to_path_buf(),
      reason: e.to_string(),
    })?;

    if config.build.dist_count == Some(0) {
      return Err(
        ConfigError::InvalidConfig {
          path: path.to_path_buf(),
          reason: "build.dist_count must be at least 1".to_string(),
        }
        .into(),
      );
    }

    Ok(config)
  }
}

/// Values supplied on the command line (or their environment variable fallbacks)
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
  pub branch: Option<String>,
  pub remote: Option<String>,
  pub repository: Option<String>,
  pub auth: Option<String>,
  pub changelog: Option<PathBuf>,
  pub resolve_backports: Option<bool>,
  pub version_spec: Option<String>,
  pub post_version_spec: Option<String>,
  pub version_cmd: Option<String>,
  pub test_cmd: Option<String>,
  pub activity_cmd: Option<String>,
}

/// Effective settings: command line and environment, then release.toml, then defaults
#[derive(Debug, Clone)]
pub struct ReleaseSettings {
  pub branch: Option<String>,
  pub remote: String,
  pub repository: Option<String>,
  pub auth: Option<String>,
  pub changelog: PathBuf,
  pub bots: Vec<String>,
  pub resolve_backports: bool,
  pub version_spec: Option<String>,
  pub post_version_spec: Option<String>,
  pub version_cmd: Option<String>,
  pub test_cmd: Option<String>,
  pub dist_count: usize,
  pub activity_cmd: String,
}

impl Default for ReleaseSettings {
  fn default() -> Self {
    Self::resolve(None, SettingsOverrides::default())
  }
}

impl ReleaseSettings {
  pub fn resolve(file: Option<FileConfig>, overrides: SettingsOverrides) -> Self {
    let file = file.unwrap_or_default();

    Self {
      branch: overrides.branch.filter(|s| !s.is_empty()),
      remote: overrides
        .remote
        .filter(|s| !s.is_empty())
        .or(file.git.remote)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_REMOTE.to_string()),
      repository: overrides.repository.filter(|s| !s.is_empty()),
      auth: overrides.auth.filter(|s| !s.is_empty()),
      changelog: overrides
        .changelog
        .filter(|p| !p.as_os_str().is_empty())
        .or(file.changelog.path)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CHANGELOG)),
      bots: file
        .changelog
        .bots
        .unwrap_or_else(|| DEFAULT_BOTS.iter().map(|s| s.to_string()).collect()),
      resolve_backports: overrides
        .resolve_backports
        .or(file.changelog.resolve_backports)
        .unwrap_or(false),
      version_spec: overrides.version_spec.filter(|s| !s.is_empty()),
      post_version_spec: overrides.post_version_spec.filter(|s| !s.is_empty()),
      version_cmd: overrides
        .version_cmd
        .filter(|s| !s.is_empty())
        .or(file.build.version_cmd)
        .filter(|s| !s.is_empty()),
      test_cmd: overrides
        .test_cmd
        .filter(|s| !s.is_empty())
        .or(file.build.test_cmd)
        .filter(|s| !s.is_empty()),
      dist_count: file.build.dist_count.unwrap_or(DEFAULT_DIST_COUNT),
      activity_cmd: overrides
        .activity_cmd
        .filter(|s| !s.is_empty())
        .or(file.activity.command)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ACTIVITY_CMD.to_string()),
    }
  }

  /// `remote/branch`, the reference releases are cut from
  pub fn target_ref(&self, branch: &str) -> String {
    format!("{}/{}", self.remote, branch)
  }

  /// Version spec, or an error for steps that cannot run without one
  pub fn require_version_spec(&self) -> ReleaseResult<&str> {
    self
      .version_spec
      .as_deref()
      .ok_or_else(|| ConfigError::NoVersionSpecified.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_defaults_without_config() {
    let settings = ReleaseSettings::default();
    assert_eq!(settings.remote, "upstream");
    assert_eq!(settings.changelog, PathBuf::from("CHANGELOG.md"));
    assert_eq!(settings.bots, vec!["meeseeksmachine"]);
    assert_eq!(settings.dist_count, 2);
    assert!(!settings.resolve_backports);
  }

  #[test]
  fn test_flags_win_over_file() {
    let file = FileConfig::parse(
      r#"
[git]
remote = "origin"

[changelog]
path = "docs/CHANGES.md"
resolve_backports = true
"#,
      Path::new("release.toml"),
    )
    .unwrap();

    let overrides = SettingsOverrides {
      remote: Some("fork".to_string()),
      ..Default::default()
    };
    let settings = ReleaseSettings::resolve(Some(file), overrides);

    assert_eq!(settings.remote, "fork");
    assert_eq!(settings.changelog, PathBuf::from("docs/CHANGES.md"));
    assert!(settings.resolve_backports);
  }

  #[test]
  fn test_empty_env_values_count_as_unset() {
    let overrides = SettingsOverrides {
      version_spec: Some(String::new()),
      branch: Some(String::new()),
      ..Default::default()
    };
    let settings = ReleaseSettings::resolve(None, overrides);
    assert!(settings.version_spec.is_none());
    assert!(settings.branch.is_none());
    assert!(settings.require_version_spec().is_err());
  }

  #[test]
  fn test_empty_remote_and_commands_fall_back() {
    let file = FileConfig::parse(
      "[git]\nremote = \"origin\"\n\n[build]\nversion_cmd = \"tbump\"\n",
      Path::new("release.toml"),
    )
    .unwrap();
    let overrides = SettingsOverrides {
      remote: Some(String::new()),
      activity_cmd: Some(String::new()),
      version_cmd: Some(String::new()),
      changelog: Some(PathBuf::new()),
      ..Default::default()
    };

    let settings = ReleaseSettings::resolve(Some(file), overrides);
    assert_eq!(settings.remote, "origin");
    assert_eq!(settings.activity_cmd, "github-activity");
    assert_eq!(settings.version_cmd.as_deref(), Some("tbump"));
    assert_eq!(settings.changelog, PathBuf::from("CHANGELOG.md"));

    let settings = ReleaseSettings::resolve(
      None,
      SettingsOverrides {
        remote: Some(String::new()),
        ..Default::default()
      },
    );
    assert_eq!(settings.remote, "upstream");
  }

  #[test]
  fn test_unknown_keys_rejected() {
    let err = FileConfig::parse("[git]\nremtoe = \"origin\"\n", Path::new("release.toml")).unwrap_err();
    assert!(err.to_string().contains("release.toml"));
  }

  #[test]
  fn test_zero_dist_count_rejected() {
    assert!(FileConfig::parse("[build]\ndist_count = 0\n", Path::new("release.toml")).is_err());
  }

  #[test]
  fn test_load_searches_dot_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".config")).unwrap();
    fs::write(
      dir.path().join(".config").join("release.toml"),
      "[activity]\ncommand = \"my-activity\"\n",
    )
    .unwrap();

    let config = FileConfig::load(dir.path()).unwrap().unwrap();
    assert_eq!(config.activity.command.as_deref(), Some("my-activity"));
  }

  #[test]
  fn test_load_missing_is_none() {
    let dir = tempfile::tempdir().unwrap();
    assert!(FileConfig::load(dir.path()).unwrap().is_none());
  }
}
