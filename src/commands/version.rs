use crate::core::error::ReleaseResult;
use crate::release::version::ReleaseVersion;

/// Run the final-version command
pub fn run_final_version(version: &str) -> ReleaseResult<()> {
  println!("{}", ReleaseVersion::parse(version)?.final_version());
  Ok(())
}
