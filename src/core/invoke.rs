//! Invocation of the external build/package tool.
//!
//! The tool is a black box with a narrow contract: it returns an exit
//! code and, on success, leaves an installer matching the product
//! naming pattern under the output directory. Console output is
//! captured for the build log but never parsed for decisions. A
//! non-zero exit is recorded, not raised: the remaining steps still run
//! so the cache gate can judge the filesystem evidence.

use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::config::RunConfig;
use crate::defaults;
use crate::error::{Error, Result};
use crate::mode::{BuildMode, ModeResolution};
use crate::utils::command::{self, CapturedOutput, CommandCapture};

#[derive(Debug, Clone, Serialize)]
pub struct BuildOutcome {
    pub command: String,
    pub exit_code: i32,
    pub success: bool,
    #[serde(flatten)]
    pub output: CapturedOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoke_test: Option<SmokeTestOutcome>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SmokeTestOutcome {
    pub command: String,
    pub exit_code: i32,
    pub success: bool,
}

/// Compose the mode-specific argument list:
/// `--build --package [--release --version <V> [--docs --url <U>]]`.
pub fn compose_args(config: &RunConfig, resolution: &ModeResolution) -> Result<Vec<String>> {
    let mut args = config.build.package_args.clone();

    if resolution.mode == BuildMode::Deploy {
        let version = resolution.version.as_deref().ok_or_else(|| {
            Error::validation("version", "deploy build without a release version")
        })?;
        args.extend(config.build.release_args.iter().cloned());
        args.push("--version".to_string());
        args.push(version.to_string());
        if let Some(url) = &config.upload_url {
            args.push("--docs".to_string());
            args.push("--url".to_string());
            args.push(url.clone());
        }
    }

    Ok(args)
}

/// Run the build tool synchronously and capture the result.
pub fn invoke(config: &RunConfig, resolution: &ModeResolution) -> Result<BuildOutcome> {
    let args = compose_args(config, resolution)?;
    let envs = release_envs(config, resolution);

    log_status!("build", "Invoking {} {}", config.build.program, args.join(" "));
    let capture = capture_or_absorb(config, &args, &envs);

    let mut outcome = BuildOutcome {
        command: render_command(&config.build.program, &args),
        exit_code: capture.exit_code,
        success: capture.success,
        output: capture.output,
        log_path: None,
        smoke_test: None,
    };

    // Smoke-test the produced application on routine builds. Pointless
    // after a failed package step, so it only runs on success.
    if resolution.mode == BuildMode::WorkInProgress && outcome.success {
        let smoke = capture_or_absorb(config, &config.build.smoke_install_args, &[]);
        outcome.output.stdout.push_str(&smoke.output.stdout);
        outcome.output.stderr.push_str(&smoke.output.stderr);
        outcome.smoke_test = Some(SmokeTestOutcome {
            command: render_command(&config.build.program, &config.build.smoke_install_args),
            exit_code: smoke.exit_code,
            success: smoke.success,
        });
    }

    outcome.log_path = write_build_log(config, &outcome);
    Ok(outcome)
}

fn release_envs(config: &RunConfig, resolution: &ModeResolution) -> Vec<(String, String)> {
    // The token is opaque to the orchestrator; the external release
    // mechanism inside the build tool consumes it.
    match (&resolution.mode, &config.release.token) {
        (BuildMode::Deploy, Some(token)) => {
            vec![(config.release.token_env.clone(), token.clone())]
        }
        _ => Vec::new(),
    }
}

/// A spawn failure carries no exit code; absorb it as a failed capture
/// so downstream steps still run and the cache gate can veto persisting.
fn capture_or_absorb(
    config: &RunConfig,
    args: &[String],
    envs: &[(String, String)],
) -> CommandCapture {
    match command::capture(
        &config.build.program,
        args,
        Some(&config.workspace),
        envs,
    ) {
        Ok(capture) => capture,
        Err(e) => CommandCapture {
            exit_code: 127,
            success: false,
            output: CapturedOutput::new(String::new(), e.to_string()),
        },
    }
}

fn render_command(program: &str, args: &[String]) -> String {
    let mut rendered = program.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(arg);
    }
    rendered
}

/// Best-effort capture of console output into the output directory so
/// the CI platform can publish it as an artifact.
fn write_build_log(config: &RunConfig, outcome: &BuildOutcome) -> Option<String> {
    let path = config.build.out_dir.join(defaults::BUILD_LOG_NAME);
    let mut content = String::with_capacity(
        outcome.output.stdout.len() + outcome.output.stderr.len() + 64,
    );
    content.push_str(&outcome.output.stdout);
    if !outcome.output.stderr.is_empty() {
        content.push_str("\n--- stderr ---\n");
        content.push_str(&outcome.output.stderr);
    }

    if let Err(e) = fs::create_dir_all(&config.build.out_dir).and_then(|_| {
        fs::write(&path, &content)
    }) {
        log_status!("build", "Could not write {}: {}", path.display(), e);
        return None;
    }
    Some(path_string(&path))
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
