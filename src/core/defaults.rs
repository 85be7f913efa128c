//! Default values for stagehand.json settings.
//!
//! Every function here backs a `#[serde(default = ...)]` attribute in
//! `config.rs`, so a minimal config file only needs to name the product,
//! the toolchain, and the build tool.

/// Name of the captured build output file placed in the output directory.
pub const BUILD_LOG_NAME: &str = "build.log";

/// Changelog artifact extensions published alongside the installer.
pub const CHANGELOG_EXTENSIONS: [&str; 3] = ["txt", "md", "html"];

pub fn tag_prefix() -> String {
    "deploy".to_string()
}

pub fn delimiter() -> char {
    '_'
}

pub fn setup_suffix() -> String {
    "_Setup.exe".to_string()
}

pub fn primary_branch() -> String {
    "master".to_string()
}

pub fn download_timeout_secs() -> u64 {
    300
}

pub fn package_args() -> Vec<String> {
    vec!["--build".to_string(), "--package".to_string()]
}

pub fn release_args() -> Vec<String> {
    vec!["--release".to_string()]
}

pub fn smoke_install_args() -> Vec<String> {
    vec!["--install".to_string()]
}

pub fn token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_starts_with_delimiter() {
        // The version extraction contract slices between the first and
        // last delimiter; the suffix must begin at the last one.
        assert!(setup_suffix().starts_with(delimiter()));
    }
}
