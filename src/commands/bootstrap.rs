use clap::Args;
use serde::Serialize;

use stagehand::toolchain::{self, BootstrapOutput, DependencyState, DependencyStatus};

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct BootstrapArgs {
    #[command(flatten)]
    pub ci: CiArgs,

    /// Report dependency state without installing anything
    #[arg(long)]
    pub check: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BootstrapResult {
    Provisioned(BootstrapOutput),
    Checked { dependencies: Vec<DependencyStatus> },
}

pub fn run(args: BootstrapArgs) -> CmdResult<BootstrapResult> {
    let config = args.ci.load_config()?;

    if args.check {
        let dependencies = toolchain::check(&config)?;
        let all_ok = dependencies
            .iter()
            .all(|dep| matches!(dep.status, DependencyState::Ok));
        let exit_code = if all_ok { 0 } else { 1 };
        return Ok((BootstrapResult::Checked { dependencies }, exit_code));
    }

    let output = toolchain::ensure(&config)?;
    Ok((BootstrapResult::Provisioned(output), 0))
}
