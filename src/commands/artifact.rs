use clap::Args;
use serde::Serialize;

use stagehand::artifact::{self, DiscoveredArtifact, PublishedArtifacts};

use crate::commands::{CiArgs, CmdResult};

#[derive(Args)]
pub struct ArtifactArgs {
    #[command(flatten)]
    pub ci: CiArgs,
}

#[derive(Debug, Serialize)]
pub struct ArtifactOutput {
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact: Option<DiscoveredArtifact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publishes: Option<PublishedArtifacts>,
}

pub fn run(args: ArtifactArgs) -> CmdResult<ArtifactOutput> {
    let config = args.ci.load_config()?;

    let output = match artifact::discover(&config)? {
        Some(found) => {
            let publishes =
                artifact::published_artifacts(&config, std::path::Path::new(&found.path));
            ArtifactOutput {
                found: true,
                artifact: Some(found),
                publishes: Some(publishes),
            }
        }
        None => ArtifactOutput {
            found: false,
            artifact: None,
            publishes: None,
        },
    };

    Ok((output, 0))
}
