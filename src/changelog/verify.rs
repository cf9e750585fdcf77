//! Reconciliation of the edited changelog entry against freshly synthesized activity
//!
//! Maintainers may reword titles or add prose, but the set of `[#N]` references must
//! match what was actually merged in the release window.

use crate::core::error::{ReleaseResult, VerifyError};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

static PR_REFERENCE: LazyLock<Regex> =
  LazyLock::new(|| Regex::new(r"\[#(\d+)\]").expect("valid pull request reference regex"));

/// Every `[#N]` reference in the text
pub fn pull_request_numbers(text: &str) -> BTreeSet<u64> {
  PR_REFERENCE
    .captures_iter(text)
    .filter_map(|caps| caps.get(1))
    .filter_map(|m| m.as_str().parse().ok())
    .collect()
}

/// A raw-entry PR may be left out when its own line mentions the changelog
fn is_exempt(raw_entry: &str, number: u64) -> bool {
  let reference = format!("[#{}]", number);
  raw_entry
    .lines()
    .any(|line| line.contains(&reference) && line.to_lowercase().contains("changelog"))
}

/// Check that `final_entry` describes exactly the PRs in `raw_entry` for `version`
pub fn verify_entry(final_entry: &str, raw_entry: &str, version: &str) -> ReleaseResult<()> {
  if !final_entry.contains(&format!("# {}", version)) {
    return Err(
      VerifyError::MissingVersionHeading {
        version: version.to_string(),
      }
      .into(),
    );
  }

  let final_prs = pull_request_numbers(final_entry);
  let raw_prs = pull_request_numbers(raw_entry);

  for &number in raw_prs.difference(&final_prs) {
    if is_exempt(raw_entry, number) {
      tracing::debug!(number, "changelog pull request exempt from reconciliation");
      continue;
    }
    return Err(VerifyError::MissingPullRequest { number }.into());
  }

  if let Some(&number) = final_prs.difference(&raw_prs).next() {
    return Err(
      VerifyError::ForeignPullRequest {
        number,
        version: version.to_string(),
      }
      .into(),
    );
  }

  Ok(())
}
