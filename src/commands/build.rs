use clap::Args;

use stagehand::invoke::{self, BuildOutcome};
use stagehand::mode;

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct BuildArgs {
    #[command(flatten)]
    pub ci: CiArgs,
}

/// Resolve the mode (without side effects) and invoke the build tool.
/// The exit code mirrors the tool's own: a failed build is reported,
/// not raised.
pub fn run(args: BuildArgs) -> CmdResult<BuildOutcome> {
    let config = args.ci.load_config()?;
    let resolution = mode::resolve(&config)?;
    let outcome = invoke::invoke(&config, &resolution)?;

    let exit_code = if outcome.success { 0 } else { outcome.exit_code };
    Ok((outcome, exit_code))
}
