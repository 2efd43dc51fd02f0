use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "hls-distribution")]
#[command(about = "Distribute media tracks to an HLS delivery channel")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "hls-distribution.toml")]
    pub config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Segment a track and publish it under the distribution directory
    Distribute {
        #[command(flatten)]
        target: TargetArgs,

        /// Do not verify that the playlist and its segments exist afterwards
        #[arg(long)]
        skip_availability_check: bool,
    },
    /// Remove a previously distributed track
    Retract {
        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Debug, Clone, Args)]
pub struct TargetArgs {
    /// Package description (JSON)
    #[arg(short, long)]
    pub package: PathBuf,

    /// Identifier of the element inside the package
    #[arg(short, long)]
    pub element: String,

    /// Write the package back with the distributed element added (or the retracted one removed)
    #[arg(long)]
    pub update_package: bool,
}

impl Command {
    pub fn target(&self) -> &TargetArgs {
        match self {
            Command::Distribute { target, .. } | Command::Retract { target } => target,
        }
    }
}
