//! The orchestration run: five steps, strictly in order.
//!
//! Bootstrapper → mode resolution → build invocation → artifact
//! version extraction → cache gate. Each step writes its result into
//! the shared [`RunContext`]; the pipeline halts on fatal failures and
//! carries on past degraded ones so the cache gate always gets to rule
//! on whatever the build left behind.

use serde::Serialize;

use crate::artifact::{self, DiscoveredArtifact, PublishedArtifacts};
use crate::cache::{self, CacheCheck};
use crate::config::RunConfig;
use crate::error::Result;
use crate::invoke::{self, BuildOutcome};
use crate::mode::{self, BuildMode, ModeResolution};
use crate::pipeline::{self, PipelineResult, Step, StepOutcome};
use crate::toolchain::{self, BootstrapOutput};

pub struct RunContext {
    pub config: RunConfig,
    pub bootstrap: Option<BootstrapOutput>,
    pub resolution: Option<ModeResolution>,
    pub build: Option<BuildOutcome>,
    pub artifact: Option<DiscoveredArtifact>,
    pub cache: Option<CacheCheck>,
}

impl RunContext {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            bootstrap: None,
            resolution: None,
            build: None,
            artifact: None,
            cache: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<BuildMode>,
    /// Canonical build identifier, recovered from the installer
    /// filename. Stays unset when no installer was found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub cache_persist: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifacts: Option<PublishedArtifacts>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bootstrap: Option<BootstrapOutput>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<BuildOutcome>,
    pub pipeline: PipelineResult,
    pub success: bool,
    pub completed_at: String,
}

const STEPS: &[Step<RunContext>] = &[
    Step {
        id: "bootstrap",
        run: step_bootstrap,
    },
    Step {
        id: "resolve",
        run: step_resolve,
    },
    Step {
        id: "build",
        run: step_build,
    },
    Step {
        id: "artifact",
        run: step_artifact,
    },
    Step {
        id: "cache",
        run: step_cache,
    },
];

/// Execute the full orchestration and derive the process exit code:
/// 0 on success, the halting error's code on fatal abort, 1 when the
/// run completed but a step failed.
pub fn execute(config: RunConfig) -> Result<(RunReport, i32)> {
    let mut ctx = RunContext::new(config);
    let result = pipeline::run(STEPS, &mut ctx);

    let exit_code = match result.fatal_exit_code() {
        Some(code) => code,
        None if result.failed() => 1,
        None => 0,
    };

    Ok((build_report(ctx, result), exit_code))
}

fn build_report(ctx: RunContext, result: PipelineResult) -> RunReport {
    let success = result.halted_by.is_none() && !result.failed();
    let artifacts = ctx.artifact.as_ref().map(|artifact| {
        artifact::published_artifacts(&ctx.config, std::path::Path::new(&artifact.path))
    });

    RunReport {
        mode: ctx.resolution.as_ref().map(|r| r.mode),
        version: ctx.artifact.as_ref().and_then(|a| a.version.clone()),
        cache_persist: ctx.cache.as_ref().map(|c| c.persist).unwrap_or(true),
        artifacts,
        bootstrap: ctx.bootstrap,
        build: ctx.build,
        pipeline: result,
        success,
        completed_at: chrono::Utc::now().to_rfc3339(),
    }
}

fn step_bootstrap(ctx: &mut RunContext) -> StepOutcome {
    match toolchain::ensure(&ctx.config) {
        Ok(output) => {
            ctx.bootstrap = Some(output);
            StepOutcome::Completed
        }
        Err(error) => StepOutcome::Failed { error, fatal: true },
    }
}

fn step_resolve(ctx: &mut RunContext) -> StepOutcome {
    match mode::resolve_and_prepare(&ctx.config) {
        Ok(resolution) => {
            ctx.resolution = Some(resolution);
            StepOutcome::Completed
        }
        Err(error) => StepOutcome::Failed { error, fatal: true },
    }
}

fn step_build(ctx: &mut RunContext) -> StepOutcome {
    let Some(resolution) = ctx.resolution.clone() else {
        return StepOutcome::Skipped("no resolved build mode".to_string());
    };

    match invoke::invoke(&ctx.config, &resolution) {
        Ok(outcome) => {
            let build_ok = outcome.success;
            let smoke_ok = outcome
                .smoke_test
                .as_ref()
                .map(|smoke| smoke.success)
                .unwrap_or(true);
            let exit_code = outcome.exit_code;
            ctx.build = Some(outcome);

            if build_ok && smoke_ok {
                StepOutcome::Completed
            } else {
                StepOutcome::Failed {
                    error: crate::error::Error::Other(format!(
                        "build tool exited {}",
                        exit_code
                    )),
                    fatal: false,
                }
            }
        }
        Err(error) => StepOutcome::Failed {
            error,
            fatal: false,
        },
    }
}

fn step_artifact(ctx: &mut RunContext) -> StepOutcome {
    match artifact::discover(&ctx.config) {
        Ok(Some(found)) => {
            ctx.artifact = Some(found);
            StepOutcome::Completed
        }
        // No matching installer: the run continues and the reported
        // version simply stays unset.
        Ok(None) => StepOutcome::Completed,
        Err(error) => StepOutcome::Failed {
            error,
            fatal: false,
        },
    }
}

fn step_cache(ctx: &mut RunContext) -> StepOutcome {
    ctx.cache = Some(cache::decide(&ctx.config.product.installed_binary));
    StepOutcome::Completed
}
