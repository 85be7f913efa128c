//! Installer discovery and filename-encoded version extraction.
//!
//! The build tool leaves an installer named
//! `<product><delim><version><suffix>` somewhere under the output
//! directory. The version is the slice strictly between the first and
//! last delimiter; extraction only counts when recomposing
//! prefix + delimiter + version + suffix reproduces the filename
//! exactly. Finding no installer is not an error here; the caller
//! decides what a missing artifact means.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{Product, RunConfig};
use crate::defaults;
use crate::error::{Error, Result};
use crate::utils::parser;

#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredArtifact {
    pub path: String,
    pub file_name: String,
    /// Version recovered from the filename; None when the name does not
    /// round-trip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Artifact set the CI platform publishes, with names resolved from the
/// discovered installer filename.
#[derive(Debug, Clone, Serialize)]
pub struct PublishedArtifacts {
    pub installer: String,
    pub build_log: String,
    pub changelogs: Vec<String>,
}

/// Search the output directory recursively for the product installer.
///
/// At most one match is expected; when several exist the newest by
/// modification time wins.
pub fn find_installer(config: &RunConfig) -> Result<Option<PathBuf>> {
    let product = &config.product;
    let pattern = format!(
        "{}/**/{}{}*{}",
        config.build.out_dir.display(),
        product.name,
        product.delimiter,
        product.setup_suffix
    );

    let entries: Vec<PathBuf> = glob::glob(&pattern)
        .map_err(|e| Error::Other(format!("Invalid artifact pattern '{}': {}", pattern, e)))?
        .filter_map(|entry| entry.ok())
        .filter(|p| p.is_file())
        .collect();

    if entries.len() > 1 {
        log_status!(
            "artifact",
            "{} files match '{}', using newest",
            entries.len(),
            pattern
        );
    }

    Ok(entries
        .into_iter()
        .max_by_key(|p| p.metadata().and_then(|m| m.modified()).ok()))
}

/// Extract the version from an installer filename, validating that the
/// name recomposes exactly from prefix, version, and suffix.
pub fn parse_installer_name(file_name: &str, product: &Product) -> Option<String> {
    let version = parser::slice_between_first_last(file_name, product.delimiter)?;
    let recomposed = compose_installer_name(product, version);
    if recomposed == file_name {
        Some(version.to_string())
    } else {
        None
    }
}

/// `<product><delim><version><suffix>` — the inverse of
/// [`parse_installer_name`].
pub fn compose_installer_name(product: &Product, version: &str) -> String {
    format!(
        "{}{}{}{}",
        product.name, product.delimiter, version, product.setup_suffix
    )
}

/// Locate the installer and recover its embedded version.
pub fn discover(config: &RunConfig) -> Result<Option<DiscoveredArtifact>> {
    let Some(path) = find_installer(config)? else {
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let version = parse_installer_name(&file_name, &config.product);

    Ok(Some(DiscoveredArtifact {
        path: path.to_string_lossy().to_string(),
        file_name,
        version,
    }))
}

/// Resolve the published artifact names from the installer filename.
pub fn published_artifacts(config: &RunConfig, installer: &Path) -> PublishedArtifacts {
    let out_dir = &config.build.out_dir;
    let stem = installer
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let stem = stem
        .strip_suffix(&config.product.setup_suffix)
        .map(|s| s.to_string())
        .unwrap_or(stem);

    let changelogs = defaults::CHANGELOG_EXTENSIONS
        .iter()
        .map(|ext| {
            out_dir
                .join(format!(
                    "{}{}CHANGELOG.{}",
                    stem, config.product.delimiter, ext
                ))
                .to_string_lossy()
                .to_string()
        })
        .collect();

    PublishedArtifacts {
        installer: installer.to_string_lossy().to_string(),
        build_log: out_dir
            .join(defaults::BUILD_LOG_NAME)
            .to_string_lossy()
            .to_string(),
        changelogs,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config;
    use std::fs;
    use tempfile::TempDir;

    fn product() -> Product {
        Product {
            name: "Nightjar".to_string(),
            delimiter: '_',
            setup_suffix: "_Setup.exe".to_string(),
            installed_binary: PathBuf::from("/opt/nightjar/Nightjar.exe"),
        }
    }

    fn dist_config(dir: &TempDir) -> RunConfig {
        let mut cfg = config::tests::minimal(dir.path());
        cfg.build.out_dir = dir.path().join("dist");
        fs::create_dir_all(&cfg.build.out_dir).unwrap();
        cfg
    }

    #[test]
    fn version_extraction_round_trips() {
        let p = product();
        let version = parse_installer_name("Nightjar_0.5.1_Setup.exe", &p).unwrap();
        assert_eq!(version, "0.5.1");
        assert_eq!(
            compose_installer_name(&p, &version),
            "Nightjar_0.5.1_Setup.exe"
        );
    }

    #[test]
    fn version_may_contain_inner_delimiters() {
        // First/last slicing keeps everything between the outer
        // delimiters, so pre-release markers survive.
        assert_eq!(
            parse_installer_name("Nightjar_2.0.0_rc1_Setup.exe", &product()).as_deref(),
            Some("2.0.0_rc1")
        );
    }

    #[test]
    fn wrong_prefix_fails_round_trip() {
        assert_eq!(parse_installer_name("Owl_0.5.1_Setup.exe", &product()), None);
    }

    #[test]
    fn single_delimiter_yields_no_version() {
        assert_eq!(parse_installer_name("Nightjar_Setup.exe", &product()), None);
    }

    #[test]
    fn discover_finds_nested_installer() {
        let dir = TempDir::new().unwrap();
        let cfg = dist_config(&dir);
        let nested = cfg.build.out_dir.join("output");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("Nightjar_0.5.1_Setup.exe"), b"exe").unwrap();

        let artifact = discover(&cfg).unwrap().expect("artifact");
        assert_eq!(artifact.file_name, "Nightjar_0.5.1_Setup.exe");
        assert_eq!(artifact.version.as_deref(), Some("0.5.1"));
    }

    #[test]
    fn discover_tolerates_no_artifact() {
        let dir = TempDir::new().unwrap();
        let cfg = dist_config(&dir);
        assert!(discover(&cfg).unwrap().is_none());
    }

    #[test]
    fn discover_ignores_other_products() {
        let dir = TempDir::new().unwrap();
        let cfg = dist_config(&dir);
        fs::write(cfg.build.out_dir.join("Owl_1.0.0_Setup.exe"), b"exe").unwrap();
        assert!(discover(&cfg).unwrap().is_none());
    }

    #[test]
    fn published_names_derive_from_installer() {
        let dir = TempDir::new().unwrap();
        let cfg = dist_config(&dir);
        let installer = cfg.build.out_dir.join("Nightjar_0.5.1_Setup.exe");

        let artifacts = published_artifacts(&cfg, &installer);
        assert!(artifacts.installer.ends_with("Nightjar_0.5.1_Setup.exe"));
        assert!(artifacts.build_log.ends_with("build.log"));
        assert_eq!(artifacts.changelogs.len(), 3);
        assert!(artifacts.changelogs[0].ends_with("Nightjar_0.5.1_CHANGELOG.txt"));
        assert!(artifacts.changelogs[2].ends_with("Nightjar_0.5.1_CHANGELOG.html"));
    }
}
