//! Run configuration: one immutable record assembled at process start.
//!
//! Two layers: `FileConfig` mirrors stagehand.json, `RunConfig` is the
//! resolved record handed by reference to every component. CI-provided
//! inputs (tag metadata, workspace, upload endpoint) arrive as CLI flags;
//! nothing in the core reads ambient environment state.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::defaults;
use crate::error::{Error, Result};

// ============================================================================
// File layer (stagehand.json)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub product: ProductConfig,
    pub toolchain: ToolchainConfig,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    pub build: BuildToolConfig,
    #[serde(default)]
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductConfig {
    /// Installer filename prefix, e.g. "Nightjar" for Nightjar_1.2.3_Setup.exe.
    pub name: String,
    #[serde(default = "defaults::delimiter")]
    pub delimiter: char,
    #[serde(default = "defaults::setup_suffix")]
    pub setup_suffix: String,
    /// Installed application binary checked by the cache gate.
    pub installed_binary: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolchainConfig {
    pub name: String,
    pub version: String,
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub install_args: Vec<String>,
    pub target_dir: String,
    /// Presence of this path is the sole idempotency check.
    pub marker_path: String,
    /// Package-install tool inside the toolchain (pip-style CLI).
    pub package_tool: String,
    #[serde(default)]
    pub support_installers: Vec<InstallerSpec>,
    /// System library that shadows the toolchain's own copy; removed
    /// unconditionally, even on a cache hit.
    #[serde(default)]
    pub conflicting_library: Option<String>,
    #[serde(default = "defaults::download_timeout_secs")]
    pub download_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallerSpec {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub install_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencySpec {
    pub name: String,
    pub version: String,
    /// Wheel-style direct URL; when absent the package tool resolves
    /// `name==version` itself.
    #[serde(default)]
    pub url: Option<String>,
    /// Registration command that must run on every orchestration run,
    /// even when installation is skipped.
    #[serde(default)]
    pub post_install: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildToolConfig {
    pub program: String,
    pub out_dir: String,
    #[serde(default = "defaults::package_args")]
    pub package_args: Vec<String>,
    #[serde(default = "defaults::release_args")]
    pub release_args: Vec<String>,
    #[serde(default = "defaults::smoke_install_args")]
    pub smoke_install_args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReleaseConfig {
    #[serde(default = "defaults::tag_prefix")]
    pub tag_prefix: String,
    #[serde(default = "defaults::primary_branch")]
    pub primary_branch: String,
    /// Opaque token for the external notification/release mechanism.
    /// Never read or validated here; injected into the build tool's
    /// environment on deploy.
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "defaults::token_env")]
    pub token_env: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        Self {
            tag_prefix: defaults::tag_prefix(),
            primary_branch: defaults::primary_branch(),
            token: None,
            token_env: defaults::token_env(),
        }
    }
}

// ============================================================================
// CI inputs (CLI flags)
// ============================================================================

/// The read-only inputs the CI platform provides for one run.
#[derive(Debug, Clone, Default)]
pub struct CiInputs {
    pub workspace: PathBuf,
    pub is_tag: bool,
    pub tag: String,
    pub upload_url: Option<String>,
}

// ============================================================================
// Resolved layer
// ============================================================================

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub workspace: PathBuf,
    pub is_tag: bool,
    pub tag: String,
    pub upload_url: Option<String>,
    pub product: Product,
    pub toolchain: Toolchain,
    pub dependencies: Vec<DependencySpec>,
    pub build: BuildTool,
    pub release: ReleaseConfig,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub name: String,
    pub delimiter: char,
    pub setup_suffix: String,
    pub installed_binary: PathBuf,
}

#[derive(Debug, Clone)]
pub struct Toolchain {
    pub name: String,
    pub version: String,
    pub url: String,
    pub sha256: Option<String>,
    pub install_args: Vec<String>,
    pub target_dir: PathBuf,
    pub marker_path: PathBuf,
    pub package_tool: PathBuf,
    pub support_installers: Vec<InstallerSpec>,
    pub conflicting_library: Option<PathBuf>,
    pub download_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct BuildTool {
    pub program: String,
    pub out_dir: PathBuf,
    pub package_args: Vec<String>,
    pub release_args: Vec<String>,
    pub smoke_install_args: Vec<String>,
}

impl RunConfig {
    /// Read stagehand.json and combine it with the CI inputs into the
    /// record every component receives by reference.
    pub fn load(config_path: &Path, ci: CiInputs) -> Result<RunConfig> {
        let raw = fs::read_to_string(config_path).map_err(|e| {
            Error::Config(format!(
                "Cannot read {}: {}",
                config_path.display(),
                e
            ))
        })?;
        let file: FileConfig = serde_json::from_str(&raw)
            .map_err(|e| Error::Config(format!("Invalid {}: {}", config_path.display(), e)))?;
        Self::assemble(file, ci)
    }

    pub fn assemble(file: FileConfig, ci: CiInputs) -> Result<RunConfig> {
        if file.product.name.contains(file.product.delimiter) {
            return Err(Error::validation(
                "product.name",
                format!(
                    "must not contain the delimiter '{}'",
                    file.product.delimiter
                ),
            ));
        }
        if !file.product.setup_suffix.starts_with(file.product.delimiter) {
            return Err(Error::validation(
                "product.setupSuffix",
                format!("must start with the delimiter '{}'", file.product.delimiter),
            ));
        }
        if file.release.tag_prefix.contains(file.product.delimiter) {
            return Err(Error::validation(
                "release.tagPrefix",
                format!(
                    "must not contain the delimiter '{}'",
                    file.product.delimiter
                ),
            ));
        }

        let workspace = ci.workspace.clone();
        Ok(RunConfig {
            product: Product {
                name: file.product.name,
                delimiter: file.product.delimiter,
                setup_suffix: file.product.setup_suffix,
                installed_binary: resolve_path(&workspace, &file.product.installed_binary),
            },
            toolchain: Toolchain {
                name: file.toolchain.name,
                version: file.toolchain.version,
                url: file.toolchain.url,
                sha256: file.toolchain.sha256,
                install_args: file.toolchain.install_args,
                target_dir: resolve_path(&workspace, &file.toolchain.target_dir),
                marker_path: resolve_path(&workspace, &file.toolchain.marker_path),
                package_tool: resolve_path(&workspace, &file.toolchain.package_tool),
                support_installers: file.toolchain.support_installers,
                conflicting_library: file
                    .toolchain
                    .conflicting_library
                    .as_deref()
                    .map(|p| resolve_path(&workspace, p)),
                download_timeout_secs: file.toolchain.download_timeout_secs,
            },
            dependencies: file.dependencies,
            build: BuildTool {
                program: expand(&file.build.program),
                out_dir: resolve_path(&workspace, &file.build.out_dir),
                package_args: file.build.package_args,
                release_args: file.build.release_args,
                smoke_install_args: file.build.smoke_install_args,
            },
            release: file.release,
            workspace,
            is_tag: ci.is_tag,
            tag: ci.tag,
            upload_url: ci.upload_url,
        })
    }
}

fn expand(value: &str) -> String {
    shellexpand::tilde(value).to_string()
}

/// Expand `~` and resolve relative paths against the workspace root.
fn resolve_path(workspace: &Path, value: &str) -> PathBuf {
    let expanded = expand(value);
    let path = PathBuf::from(&expanded);
    if path.is_absolute() {
        path
    } else {
        workspace.join(path)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn minimal_json() -> &'static str {
        r#"{
            "product": {
                "name": "Nightjar",
                "installedBinary": "/opt/nightjar/Nightjar.exe"
            },
            "toolchain": {
                "name": "buildpy",
                "version": "2.7.18",
                "url": "https://downloads.example.net/buildpy-2.7.18.exe",
                "targetDir": "/opt/buildpy",
                "markerPath": "/opt/buildpy/python.exe",
                "packageTool": "/opt/buildpy/Scripts/pip.exe"
            },
            "build": {
                "program": "/usr/bin/true",
                "outDir": "dist"
            }
        }"#
    }

    pub(crate) fn minimal(workspace: &Path) -> RunConfig {
        let file: FileConfig = serde_json::from_str(minimal_json()).unwrap();
        RunConfig::assemble(
            file,
            CiInputs {
                workspace: workspace.to_path_buf(),
                ..CiInputs::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn defaults_fill_in() {
        let cfg = minimal(Path::new("/work"));
        assert_eq!(cfg.product.delimiter, '_');
        assert_eq!(cfg.product.setup_suffix, "_Setup.exe");
        assert_eq!(cfg.release.tag_prefix, "deploy");
        assert_eq!(cfg.release.primary_branch, "master");
        assert_eq!(cfg.build.package_args, vec!["--build", "--package"]);
        assert_eq!(cfg.toolchain.download_timeout_secs, 300);
    }

    #[test]
    fn relative_paths_resolve_against_workspace() {
        let cfg = minimal(Path::new("/work"));
        assert_eq!(cfg.build.out_dir, PathBuf::from("/work/dist"));
        assert_eq!(
            cfg.product.installed_binary,
            PathBuf::from("/opt/nightjar/Nightjar.exe")
        );
    }

    #[test]
    fn delimiter_in_product_name_is_rejected() {
        let mut file: FileConfig = serde_json::from_str(minimal_json()).unwrap();
        file.product.name = "Night_jar".to_string();
        let err = RunConfig::assemble(file, CiInputs::default()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn suffix_must_start_with_delimiter() {
        let mut file: FileConfig = serde_json::from_str(minimal_json()).unwrap();
        file.product.setup_suffix = "Setup.exe".to_string();
        assert!(RunConfig::assemble(file, CiInputs::default()).is_err());
    }
}
