use clap::Args;

use stagehand::mode::{self, ModeResolution};

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct ResolveArgs {
    #[command(flatten)]
    pub ci: CiArgs,

    /// On deploy, also switch the working tree to the primary branch
    #[arg(long)]
    pub checkout: bool,
}

pub fn run(args: ResolveArgs) -> CmdResult<ModeResolution> {
    let config = args.ci.load_config()?;

    let resolution = if args.checkout {
        mode::resolve_and_prepare(&config)?
    } else {
        mode::resolve(&config)?
    };

    Ok((resolution, 0))
}
