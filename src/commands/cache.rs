use clap::Args;

use stagehand::cache::{self, CacheCheck};

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct CacheArgs {
    #[command(flatten)]
    pub ci: CiArgs,
}

pub fn run(args: CacheArgs) -> CmdResult<CacheCheck> {
    let config = args.ci.load_config()?;
    let check = cache::decide(&config.product.installed_binary);
    Ok((check, 0))
}
