//! Changelog document editing
//!
//! The changelog carries one insertion point, an empty marker pair:
//!
//! ```text
//! <!-- <START NEW CHANGELOG ENTRY> -->
//! <!-- <END NEW CHANGELOG ENTRY> -->
//! ```
//!
//! [`inject`] fills it with a new entry; [`extract`] reads back the (possibly hand
//! edited) entry and leaves a fresh empty pair above it for the next release.
//! Both are pure string transforms. Only [`read`] and [`write`] touch the filesystem.

use crate::core::error::{ChangelogError, ReleaseResult, ResultExt};
use std::fs;
use std::path::Path;

pub const START_MARKER: &str = "<!-- <START NEW CHANGELOG ENTRY> -->";
pub const END_MARKER: &str = "<!-- <END NEW CHANGELOG ENTRY> -->";

/// Result of [`extract`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
  /// Text between the markers
  pub entry: String,
  /// Document with the markers collapsed back to an empty insertion point
  pub document: String,
}

fn ensure_single(document: &str, marker: &str) -> ReleaseResult<()> {
  match document.matches(marker).count() {
    0 => Err(
      ChangelogError::MissingMarker {
        marker: marker.to_string(),
      }
      .into(),
    ),
    1 => Ok(()),
    count => Err(
      ChangelogError::DuplicateMarker {
        marker: marker.to_string(),
        count,
      }
      .into(),
    ),
  }
}

fn empty_pair() -> String {
  format!("{}\n{}", START_MARKER, END_MARKER)
}

/// Check that the document has exactly one empty insertion point
pub fn check_insertion_point(document: &str) -> ReleaseResult<()> {
  ensure_single(document, START_MARKER)?;
  ensure_single(document, END_MARKER)?;

  if !document.contains(&empty_pair()) {
    // Both markers exist once but something sits between them
    return Err(ChangelogError::MissingMarker { marker: empty_pair() }.into());
  }
  Ok(())
}

/// Put `entry` into the empty insertion point
pub fn inject(document: &str, entry: &str) -> ReleaseResult<String> {
  check_insertion_point(document)?;

  Ok(document.replacen(
    &empty_pair(),
    &format!("{}\n{}\n{}", START_MARKER, entry, END_MARKER),
    1,
  ))
}

/// Read the entry between the markers and reset the insertion point
pub fn extract(document: &str) -> ReleaseResult<Extracted> {
  ensure_single(document, START_MARKER)?;
  ensure_single(document, END_MARKER)?;

  let (before, rest) = document
    .split_once(START_MARKER)
    .ok_or_else(|| ChangelogError::MissingMarker {
      marker: START_MARKER.to_string(),
    })?;
  let (between, after) = rest
    .split_once(END_MARKER)
    .ok_or(ChangelogError::MarkersOutOfOrder)?;

  let entry = between.strip_prefix('\n').unwrap_or(between);
  let entry = entry.strip_suffix('\n').unwrap_or(entry);

  let document = format!(
    "{}{}\n{}\n{}{}",
    before,
    START_MARKER,
    END_MARKER,
    between.strip_prefix('\n').unwrap_or(between),
    after.strip_prefix('\n').unwrap_or(after)
  );

  Ok(Extracted {
    entry: entry.to_string(),
    document,
  })
}

pub fn read(path: &Path) -> ReleaseResult<String> {
  fs::read_to_string(path).with_context(|| format!("Failed to read changelog {}", path.display()))
}

pub fn write(path: &Path, document: &str) -> ReleaseResult<()> {
  fs::write(path, document).with_context(|| format!("Failed to write changelog {}", path.display()))
}
