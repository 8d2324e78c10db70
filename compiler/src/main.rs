mod accent;
mod build;
mod lookup;
mod render;
mod store_args;

use clap::Parser;
use thiserror::Error;

use crate::{accent::AccentError, build::BuildError, lookup::LookupError, render::RenderError};

#[derive(Parser, Debug)]
#[clap(name = "pitchdic", version)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Build the persisted indexes from source files.
    Build(build::Args),

    /// Print glosses and pitch-accent data of a word.
    Lookup(lookup::Args),

    /// Print the SVG diagram of a reading and a pattern.
    Render(render::Args),

    /// Print the H/L pattern of a reading from accent numbers.
    Accent(accent::Args),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    BuildError(#[from] BuildError),
    #[error(transparent)]
    LookupError(#[from] LookupError),
    #[error(transparent)]
    RenderError(#[from] RenderError),
    #[error(transparent)]
    AccentError(#[from] AccentError),
}

fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    match cli.command {
        Command::Build(args) => Ok(build::run(args)?),
        Command::Lookup(args) => Ok(lookup::run(args)?),
        Command::Render(args) => Ok(render::run(args)?),
        Command::Accent(args) => Ok(accent::run(args)?),
    }
}
