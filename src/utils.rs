//! Remote URL helpers and git path formatting

use std::path::Path;

/// True when a remote URL is a filesystem path rather than a network URL
///
/// Local: `/srv/repo`, `./repo`, `../repo`, `C:\repo`, `C:/repo`, `\\server\share`.
/// Remote: `https://...`, `ssh://...`, `git@host:org/name.git`.
pub fn is_local_path(url: &str) -> bool {
  if url.contains("://") {
    return false;
  }

  // Drive letters contain ':' so they must be recognised before the scp-style check
  let bytes = url.as_bytes();
  let drive_letter = bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && matches!(bytes[2], b'\\' | b'/');
  if drive_letter || url.starts_with("\\\\") {
    return true;
  }

  if url.contains('@') {
    return false;
  }

  url.starts_with('/') || url.starts_with("./") || url.starts_with("../") || Path::new(url).is_absolute()
}

/// Derive an `org/name` repository slug from a remote URL
///
/// Handles https (`https://github.com/org/name.git`) and scp-style ssh
/// (`git@github.com:org/name.git`) forms. Returns None when fewer than two
/// path segments remain.
pub fn repository_from_url(url: &str) -> Option<String> {
  let trimmed = url.trim().trim_end_matches('/');
  let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

  let mut parts: Vec<&str> = trimmed.rsplit('/').take(2).collect();
  if parts.len() < 2 {
    return None;
  }
  parts.reverse();

  // scp-style: "git@github.com:org" -> "org"
  let org = parts[0].rsplit(':').next().unwrap_or(parts[0]);
  let name = parts[1];
  if org.is_empty() || name.is_empty() {
    return None;
  }

  Some(format!("{}/{}", org, name))
}

/// True when `url` is a local path naming the directory `root`
pub fn is_same_local_repo(url: &str, root: &Path) -> bool {
  if !is_local_path(url) {
    return false;
  }

  let remote = root.join(url);
  match (remote.canonicalize(), root.canonicalize()) {
    (Ok(a), Ok(b)) => a == b,
    _ => false,
  }
}

/// Path as git prints it in diffs (forward slashes on every platform)
pub fn path_to_git_format(path: &Path) -> String {
  #[cfg(target_os = "windows")]
  {
    path.to_string_lossy().replace('\\', "/")
  }
  #[cfg(not(target_os = "windows"))]
  {
    path.to_string_lossy().to_string()
  }
}
