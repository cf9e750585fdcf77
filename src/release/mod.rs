//! Release pipeline
//!
//! - **version**: package version and its final (release) part
//! - **workflow**: the state machine steps are sequenced through
//! - **steps**: the concrete steps (bump, changelog, build, test, commit, tag, verify)
//! - **commit** / **digest**: SHA256 digests of the built artifacts and the release commit message
//! - **env**: CI environment resolution for `prep-env`

pub mod commit;
pub mod digest;
pub mod env;
pub mod steps;
pub mod version;
pub mod workflow;

pub use version::ReleaseVersion;
pub use workflow::{ReleaseState, Workflow};
