//! Build mode resolution from tag metadata.
//!
//! A run is a deploy iff the CI platform flagged it as a tag build AND
//! the tag text begins, case-insensitively, with the reserved prefix.
//! The release version is everything after the first delimiter; a
//! prefixed tag without a delimiter or with nothing after it is
//! malformed and fatal. The tag itself is never built from: on deploy
//! the working tree is switched to the primary branch first.

use serde::Serialize;

use crate::config::RunConfig;
use crate::error::{Error, Result};
use crate::git;
use crate::utils::parser;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildMode {
    WorkInProgress,
    Deploy,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModeResolution {
    pub mode: BuildMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Branch the working tree was switched to, when the side effect ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_out: Option<String>,
}

/// Structured result of parsing one tag against the reserved prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagParse {
    /// Tag does not carry the reserved prefix; not a deploy trigger.
    NotDeploy,
    /// Prefixed deploy tag with its release version.
    Deploy { version: String },
}

/// Parse tag text against the reserved prefix.
///
/// The split happens at the first delimiter; everything after it is the
/// version, so pre-release versions containing the delimiter survive
/// intact.
pub fn parse_tag(tag: &str, prefix: &str, delimiter: char) -> Result<TagParse> {
    if !parser::starts_with_ignore_case(tag, prefix) {
        return Ok(TagParse::NotDeploy);
    }

    let Some((_, version)) = parser::split_at_first(tag, delimiter) else {
        return Err(Error::TagInvalid(tag.to_string()));
    };
    if version.is_empty() {
        return Err(Error::TagInvalid(tag.to_string()));
    }

    Ok(TagParse::Deploy {
        version: version.to_string(),
    })
}

/// Resolve the build mode without side effects.
pub fn resolve(config: &RunConfig) -> Result<ModeResolution> {
    if !config.is_tag {
        return Ok(ModeResolution {
            mode: BuildMode::WorkInProgress,
            version: None,
            checked_out: None,
        });
    }

    match parse_tag(
        &config.tag,
        &config.release.tag_prefix,
        config.product.delimiter,
    )? {
        TagParse::NotDeploy => Ok(ModeResolution {
            mode: BuildMode::WorkInProgress,
            version: None,
            checked_out: None,
        }),
        TagParse::Deploy { version } => Ok(ModeResolution {
            mode: BuildMode::Deploy,
            version: Some(version),
            checked_out: None,
        }),
    }
}

/// Resolve the build mode and, on deploy, switch the working tree to
/// the primary branch before anything is built.
pub fn resolve_and_prepare(config: &RunConfig) -> Result<ModeResolution> {
    let mut resolution = resolve(config)?;
    if resolution.mode == BuildMode::Deploy {
        checkout_primary(config, &mut resolution)?;
    }
    Ok(resolution)
}

fn checkout_primary(config: &RunConfig, resolution: &mut ModeResolution) -> Result<()> {
    let branch = &config.release.primary_branch;
    git::checkout(&config.workspace, branch)?;
    resolution.checked_out = Some(branch.clone());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use std::path::Path;

    fn tag_config(is_tag: bool, tag: &str) -> RunConfig {
        let mut cfg = config::tests::minimal(Path::new("/work"));
        cfg.is_tag = is_tag;
        cfg.tag = tag.to_string();
        cfg
    }

    #[test]
    fn deploy_tag_yields_version() {
        assert_eq!(
            parse_tag("Deploy_1.2.3", "deploy", '_').unwrap(),
            TagParse::Deploy {
                version: "1.2.3".to_string()
            }
        );
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        assert_eq!(
            parse_tag("DEPLOY_9.9.9", "deploy", '_').unwrap(),
            TagParse::Deploy {
                version: "9.9.9".to_string()
            }
        );
    }

    #[test]
    fn version_keeps_later_delimiters() {
        assert_eq!(
            parse_tag("deploy_2.0.0_rc1", "deploy", '_').unwrap(),
            TagParse::Deploy {
                version: "2.0.0_rc1".to_string()
            }
        );
    }

    #[test]
    fn prefixed_tag_without_delimiter_is_fatal() {
        let err = parse_tag("deploy", "deploy", '_').unwrap_err();
        assert_eq!(err.code(), "TAG_INVALID");
    }

    #[test]
    fn prefixed_tag_with_empty_version_is_fatal() {
        assert!(parse_tag("deploy_", "deploy", '_').is_err());
    }

    #[test]
    fn unprefixed_tag_is_not_deploy() {
        assert_eq!(
            parse_tag("v1.2.3", "deploy", '_').unwrap(),
            TagParse::NotDeploy
        );
    }

    #[test]
    fn non_tag_run_is_wip_regardless_of_tag_text() {
        let cfg = tag_config(false, "Deploy_1.2.3");
        let resolution = resolve(&cfg).unwrap();
        assert_eq!(resolution.mode, BuildMode::WorkInProgress);
        assert!(resolution.version.is_none());
    }

    #[test]
    fn tag_run_with_deploy_tag_resolves_deploy() {
        let cfg = tag_config(true, "Deploy_1.2.3");
        let resolution = resolve(&cfg).unwrap();
        assert_eq!(resolution.mode, BuildMode::Deploy);
        assert_eq!(resolution.version.as_deref(), Some("1.2.3"));
    }

    #[test]
    fn tag_run_with_plain_tag_stays_wip() {
        let cfg = tag_config(true, "v1.2.3");
        let resolution = resolve(&cfg).unwrap();
        assert_eq!(resolution.mode, BuildMode::WorkInProgress);
    }

    #[test]
    fn malformed_deploy_tag_fails_resolution() {
        let cfg = tag_config(true, "deploy");
        assert!(resolve(&cfg).is_err());
    }
}
