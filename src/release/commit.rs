//! Release commit assembly
//!
//! The commit message is `Publish v{version}`, then `SHA256 hashes:`, then one
//! paragraph per artifact in the order the artifacts were enumerated.

use super::digest::{ArtifactDigest, digest_artifact};
use crate::adapters::{Artifact, PackageManifest};
use crate::core::config::ReleaseSettings;
use crate::core::error::{ReleaseResult, ResultExt};
use crate::core::runner::CommandRunner;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseCommit {
  pub version: String,
  pub digests: Vec<ArtifactDigest>,
}

impl ReleaseCommit {
  pub fn new(version: &str, digests: Vec<ArtifactDigest>) -> Self {
    Self {
      version: version.to_string(),
      digests,
    }
  }

  pub fn subject(&self) -> String {
    format!("Publish v{}", self.version)
  }

  /// Message paragraphs, one `-m` each
  pub fn messages(&self) -> Vec<String> {
    let mut messages = vec![self.subject(), "SHA256 hashes:".to_string()];
    messages.extend(self.digests.iter().map(ArtifactDigest::commit_line));
    messages
  }
}

/// Digest every manifest's artifacts, removing transient ones once hashed
pub fn collect_digests(
  root: &Path,
  manifests: &[Box<dyn PackageManifest>],
  runner: &dyn CommandRunner,
  settings: &ReleaseSettings,
) -> ReleaseResult<Vec<ArtifactDigest>> {
  let mut digests = Vec::new();

  for manifest in manifests {
    for artifact in manifest.collect_artifacts(runner, settings)? {
      let digest = digest_artifact(root, &artifact.path);
      if artifact.transient {
        remove_transient(root, &artifact)?;
      }

      let digest = digest?;
      println!("   {}", digest.commit_line());
      digests.push(digest);
    }
  }

  Ok(digests)
}

fn remove_transient(root: &Path, artifact: &Artifact) -> ReleaseResult<()> {
  let path = root.join(&artifact.path);
  if path.exists() {
    fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
  }
  Ok(())
}
