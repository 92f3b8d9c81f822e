mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{batch, merge, overlay, split};

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    match &cli.command {
        Commands::Merge(args) => merge::run(&cli, args),
        Commands::Overlay(args) => overlay::run(&cli, args),
        Commands::Batch(args) => batch::run(&cli, args),
        Commands::Split(args) => split::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
