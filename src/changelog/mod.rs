//! Changelog engine: synthesize an entry from merged pull requests, splice it into
//! the changelog document, and reconcile the edited entry before release.

pub mod backport;
pub mod document;
pub mod entry;
pub mod verify;

pub use backport::{BackportResolver, BotIdentities};
pub use document::{END_MARKER, START_MARKER};
pub use entry::EntrySynthesizer;
pub use verify::verify_entry;
