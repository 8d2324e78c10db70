use std::io::{self, Write};

use clap::Parser;
use pitchdic::diagram::{render, svg};
use pitchdic::pattern::to_letters;

#[derive(Parser, Debug)]
#[clap(
    name = "render",
    about = "A program to print the SVG diagram of a reading and a pattern."
)]
pub struct Args {
    /// Kana reading.
    reading: String,

    /// Pitch pattern in H/L letters or 0/1/2 digits.
    pattern: String,

    /// Wrap the SVG in a <div>.
    #[clap(long)]
    html: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub fn run(args: Args) -> Result<(), RenderError> {
    let diagram = render(&args.reading, &to_letters(&args.pattern));
    let markup = if args.html {
        svg::to_html(&diagram)
    } else {
        svg::to_svg(&diagram)
    };
    let mut out = io::stdout().lock();
    writeln!(out, "{markup}")?;
    Ok(())
}
