//! Version constants embedded at build time.

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const GIT_SHA: &str = env!("APOLLO_GIT_SHA");
pub const BUILD_DATE: &str = env!("APOLLO_BUILD_DATE");

/// One-line version string for logs and `--version` output.
pub fn version_line() -> String {
    format!("{} ({} built {})", VERSION, GIT_SHA, BUILD_DATE)
}
