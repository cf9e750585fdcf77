//! SHA-256 digests of release artifacts
//!
//! Digests are published in the release commit so downstream users can verify the
//! files they download. Files are streamed in fixed-size chunks.

use crate::core::error::{ReleaseResult, ResultExt};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

const BUF_SIZE: usize = 65536;

/// One `path: sha256` line of the release commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDigest {
  pub path: PathBuf,
  pub sha256: String,
}

impl ArtifactDigest {
  pub fn commit_line(&self) -> String {
    format!("{}: {}", self.path.display(), self.sha256)
  }
}

/// Hex SHA-256 of everything `reader` yields
pub fn sha256_reader<R: Read>(mut reader: R) -> ReleaseResult<String> {
  let mut hasher = Sha256::new();
  let mut buf = vec![0u8; BUF_SIZE];

  loop {
    let n = reader.read(&mut buf)?;
    if n == 0 {
      break;
    }
    hasher.update(&buf[..n]);
  }

  Ok(format!("{:x}", hasher.finalize()))
}

pub fn sha256_file(path: &Path) -> ReleaseResult<String> {
  let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
  sha256_reader(file).with_context(|| format!("Failed to hash {}", path.display()))
}

/// Digest `path` (relative to `root`), keeping the relative path for the commit message
pub fn digest_artifact(root: &Path, path: &Path) -> ReleaseResult<ArtifactDigest> {
  Ok(ArtifactDigest {
    path: path.to_path_buf(),
    sha256: sha256_file(&root.join(path))?,
  })
}
