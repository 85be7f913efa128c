//! Toolchain provisioning for the build host.
//!
//! Installation is keyed on a single marker path: if it exists the
//! toolchain, support installers, and pinned dependencies are all
//! skipped. Two things happen on every run regardless: the conflicting
//! system library is removed, and each dependency's registration
//! fix-up command is re-run. Any download or install failure aborts
//! the run; there is no partial-state repair.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::config::{DependencySpec, RunConfig};
use crate::error::{Error, Result};
use crate::http;
use crate::utils::command;
use crate::utils::parser;

#[derive(Debug, Clone, Serialize)]
pub struct BootstrapOutput {
    pub toolchain: String,
    /// Full install performed this run (marker path was absent).
    pub installed: bool,
    /// Idempotent skip: marker path was already present.
    pub skipped: bool,
    pub conflict_removed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies_installed: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub post_install_ran: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyState {
    Ok,
    WrongVersion,
    Missing,
}

#[derive(Debug, Clone, Serialize)]
pub struct DependencyStatus {
    pub name: String,
    pub wanted: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<String>,
    pub status: DependencyState,
}

/// Ensure the toolchain directory exists and is usable.
pub fn ensure(config: &RunConfig) -> Result<BootstrapOutput> {
    let tc = &config.toolchain;

    let conflict_removed = remove_conflicting_library(tc.conflicting_library.as_deref())?;

    let mut output = BootstrapOutput {
        toolchain: format!("{} {}", tc.name, tc.version),
        installed: false,
        skipped: false,
        conflict_removed,
        dependencies_installed: Vec::new(),
        post_install_ran: Vec::new(),
    };

    if tc.marker_path.exists() {
        log_status!("bootstrap", "{} already present, skipping install", tc.name);
        output.skipped = true;
    } else {
        install_toolchain(config)?;
        for installer in &tc.support_installers {
            install_package(
                &installer.name,
                &installer.url,
                installer.sha256.as_deref(),
                &installer.install_args,
                tc.download_timeout_secs,
            )?;
        }
        for dep in &config.dependencies {
            install_dependency(config, dep)?;
            output.dependencies_installed.push(dep.name.clone());
        }
        output.installed = true;
    }

    // Registration fix-ups run even on a cache hit; a restored cache
    // does not carry the registrations with it.
    for dep in &config.dependencies {
        if let Some(fix_up) = &dep.post_install {
            run_post_install(&dep.name, fix_up)?;
            output.post_install_ran.push(dep.name.clone());
        }
    }

    Ok(output)
}

/// Report dependency state without touching the filesystem.
pub fn check(config: &RunConfig) -> Result<Vec<DependencyStatus>> {
    let mut statuses = Vec::with_capacity(config.dependencies.len());
    for dep in &config.dependencies {
        statuses.push(probe_dependency(config, dep)?);
    }
    Ok(statuses)
}

fn probe_dependency(config: &RunConfig, dep: &DependencySpec) -> Result<DependencyStatus> {
    let tool = config.toolchain.package_tool.to_string_lossy().to_string();
    let capture = command::capture(&tool, &["show".to_string(), dep.name.clone()], None, &[]);

    let found = match capture {
        Ok(result) if result.success => {
            parser::extract_first(&result.output.stdout, r"(?m)^Version:\s*(\S+)")
        }
        _ => None,
    };

    let status = match &found {
        None => DependencyState::Missing,
        Some(version) => {
            if parser::compare_versions(version, &dep.version).is_lt() {
                DependencyState::WrongVersion
            } else {
                DependencyState::Ok
            }
        }
    };

    Ok(DependencyStatus {
        name: dep.name.clone(),
        wanted: dep.version.clone(),
        found,
        status,
    })
}

fn remove_conflicting_library(path: Option<&Path>) -> Result<bool> {
    let Some(path) = path else {
        return Ok(false);
    };
    if !path.exists() {
        return Ok(false);
    }
    fs::remove_file(path).map_err(|e| {
        Error::install(
            path.to_string_lossy(),
            format!("cannot remove conflicting library: {}", e),
        )
    })?;
    log_status!("bootstrap", "Removed conflicting library {}", path.display());
    Ok(true)
}

fn install_toolchain(config: &RunConfig) -> Result<()> {
    let tc = &config.toolchain;
    log_status!(
        "bootstrap",
        "Installing {} {} to {}",
        tc.name,
        tc.version,
        tc.target_dir.display()
    );
    install_package(
        &tc.name,
        &tc.url,
        tc.sha256.as_deref(),
        &tc.install_args,
        tc.download_timeout_secs,
    )
}

/// Download an installer and run its silent install.
fn install_package(
    name: &str,
    url: &str,
    sha256: Option<&str>,
    install_args: &[String],
    timeout_secs: u64,
) -> Result<()> {
    let installer = download_dest(url);
    http::download(url, &installer, timeout_secs, sha256)?;
    command::run(&installer, install_args, name)
        .map_err(|e| Error::install(name, e.to_string()))?;
    Ok(())
}

fn install_dependency(config: &RunConfig, dep: &DependencySpec) -> Result<()> {
    log_status!("bootstrap", "Installing {} {}", dep.name, dep.version);

    let requirement = match &dep.url {
        Some(url) => url.clone(),
        None => format!("{}=={}", dep.name, dep.version),
    };

    command::run(
        &config.toolchain.package_tool,
        &["install".to_string(), requirement],
        &dep.name,
    )
    .map_err(|e| Error::install(&dep.name, e.to_string()))?;
    Ok(())
}

fn run_post_install(name: &str, fix_up: &[String]) -> Result<()> {
    let Some((program, args)) = fix_up.split_first() else {
        return Err(Error::install(name, "empty postInstall command"));
    };
    log_status!("bootstrap", "Running post-install fix-up for {}", name);
    command::run(&PathBuf::from(program), args, name)
        .map_err(|e| Error::install(name, e.to_string()))?;
    Ok(())
}

fn download_dest(url: &str) -> PathBuf {
    let file_name = url.rsplit('/').next().unwrap_or("installer");
    env::temp_dir().join(file_name)
}
