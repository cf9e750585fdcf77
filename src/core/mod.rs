//! Core building blocks shared by every command
//!
//! - **config**: release.toml parsing and merging with flags/environment
//! - **context**: release context handed to every command and step
//! - **error**: error types with contextual help messages and exit codes
//! - **runner**: external command execution seam
//! - **vcs**: git operations (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod runner;
pub mod vcs;
