use clap::Args;
use std::path::PathBuf;

use stagehand::config::{CiInputs, RunConfig};

pub type CmdResult<T> = stagehand::Result<(T, i32)>;

/// CI-provided inputs shared by every subcommand.
///
/// These are the only ambient facts the orchestrator consumes; they are
/// folded into the immutable run configuration before any component
/// executes.
#[derive(Args, Debug, Clone)]
pub struct CiArgs {
    /// Path to the configuration file (relative to the workspace)
    #[arg(long, default_value = "stagehand.json")]
    pub config: String,

    /// Workspace root checked out by the CI platform
    #[arg(long, default_value = ".")]
    pub workspace: String,

    /// This run was triggered by a tag
    #[arg(long)]
    pub is_tag: bool,

    /// Raw tag text
    #[arg(long, default_value = "")]
    pub tag: String,

    /// Documentation upload endpoint passed through to the build tool
    #[arg(long)]
    pub upload_url: Option<String>,
}

impl CiArgs {
    pub fn load_config(&self) -> stagehand::Result<RunConfig> {
        let workspace = PathBuf::from(shellexpand::tilde(&self.workspace).to_string());
        let config_path = {
            let expanded = PathBuf::from(shellexpand::tilde(&self.config).to_string());
            if expanded.is_absolute() {
                expanded
            } else {
                workspace.join(expanded)
            }
        };

        RunConfig::load(
            &config_path,
            CiInputs {
                workspace,
                is_tag: self.is_tag,
                tag: self.tag.clone(),
                upload_url: self.upload_url.clone(),
            },
        )
    }
}

pub mod artifact;
pub mod bootstrap;
pub mod build;
pub mod cache;
pub mod resolve;
pub mod run;

/// Dispatch a command to its handler and map the result to JSON.
macro_rules! dispatch {
    ($args:expr, $module:ident) => {
        crate::output::map_cmd_result_to_json($module::run($args))
    };
}

pub(crate) fn run_json(command: crate::Commands) -> (stagehand::Result<serde_json::Value>, i32) {
    crate::tty::status("stagehand is working...");

    match command {
        crate::Commands::Run(args) => dispatch!(args, run),
        crate::Commands::Bootstrap(args) => dispatch!(args, bootstrap),
        crate::Commands::Resolve(args) => dispatch!(args, resolve),
        crate::Commands::Build(args) => dispatch!(args, build),
        crate::Commands::Artifact(args) => dispatch!(args, artifact),
        crate::Commands::Cache(args) => dispatch!(args, cache),
    }
}
