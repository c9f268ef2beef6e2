use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::quakemap::{self, ExportArgs, ServeArgs};

/// Near-real-time earthquake map, colored by depth and sized by magnitude.
#[derive(Debug, Parser)]
#[command(name = "quakemap", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch the feed and serve the interactive map.
    Serve(ServeArgs),
    /// Fetch the feed once and write the scene as JSON or HTML.
    Export(ExportArgs),
}

pub fn handle_command(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Serve(args) => quakemap::serve(args.try_into()?),
        Command::Export(args) => quakemap::export(args.try_into()?),
    }
}
