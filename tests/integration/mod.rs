//! End-to-end tests driving the release-helper binary against throwaway git repositories

mod helpers;

mod test_changelog;
mod test_env;
mod test_finalize;
mod test_release;
mod test_version;
