use clap::Args;
use std::fs;
use std::path::PathBuf;

use stagehand::log_status;
use stagehand::run::{self, RunReport};

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub ci: CiArgs,

    /// Also write the run report to this file
    #[arg(long)]
    pub report: Option<String>,
}

pub fn run(args: RunArgs) -> CmdResult<RunReport> {
    let config = args.ci.load_config()?;
    let (report, exit_code) = run::execute(config)?;

    if let Some(path) = &args.report {
        let path = PathBuf::from(shellexpand::tilde(path).to_string());
        fs::write(&path, serde_json::to_string_pretty(&report)?)?;
        log_status!("run", "Report written to {}", path.display());
    }

    Ok((report, exit_code))
}
