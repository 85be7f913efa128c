use clap::{Parser, Subcommand};

mod commands;
mod output;
mod tty;

use commands::{artifact, bootstrap, build, cache, resolve, run};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "stagehand")]
#[command(version = VERSION)]
#[command(about = "CI build and release orchestration for installer-based applications")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full orchestration pipeline
    Run(run::RunArgs),
    /// Provision the build toolchain (idempotent)
    Bootstrap(bootstrap::BootstrapArgs),
    /// Resolve work-in-progress vs deploy from tag metadata
    Resolve(resolve::ResolveArgs),
    /// Invoke the external build/package tool
    Build(build::BuildArgs),
    /// Locate the installer and extract its embedded version
    Artifact(artifact::ArtifactArgs),
    /// Decide whether the dependency cache should persist
    Cache(cache::CacheArgs),
}

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let (json_result, exit_code) = commands::run_json(cli.command);
    output::print_json_result(json_result);

    std::process::ExitCode::from(exit_code_to_u8(exit_code))
}

fn exit_code_to_u8(code: i32) -> u8 {
    if code <= 0 {
        0
    } else if code >= 255 {
        255
    } else {
        code as u8
    }
}
