use clap::Parser;
use pitchdic::diagram::render_svg;
use pitchdic::pattern::{alternatives, from_accent_number};

#[derive(Parser, Debug)]
#[clap(
    name = "accent",
    about = "A program to generate an H/L pattern from accent numbers."
)]
pub struct Args {
    /// Kana reading.
    reading: String,

    /// Accent numbers, comma-separated (e.g. 0,2).
    numbers: String,

    /// Also print the SVG diagram of each pattern.
    #[clap(long)]
    svg: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum AccentError {
    #[error("Invalid accent number: {0:?}")]
    InvalidAccentNumber(String),
}

pub fn run(args: Args) -> Result<(), AccentError> {
    if let Some(invalid) = args
        .numbers
        .trim_matches(',')
        .split(',')
        .map(str::trim)
        .find(|n| n.parse::<usize>().is_err())
    {
        return Err(AccentError::InvalidAccentNumber(invalid.to_string()));
    }

    let pattern = from_accent_number(&args.reading, &args.numbers);
    println!("{pattern}");
    if args.svg {
        for alt in alternatives(&pattern) {
            println!("{}", render_svg(&args.reading, alt));
        }
    }
    Ok(())
}
