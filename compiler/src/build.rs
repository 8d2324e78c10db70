use clap::{Parser, ValueEnum};
use pitchdic::errors::PitchdicError;
use pitchdic::store::{BuildReport, BuildStage, LexicalStore};

use crate::store_args::StoreArgs;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Dataset {
    /// The gloss dictionary (JMdict).
    Dictionary,
    /// The pitch-accent database (wadoku).
    Pitch,
    /// Both datasets.
    All,
}

#[derive(Parser, Debug)]
#[clap(
    name = "build",
    about = "A program to build the persisted indexes of the lexical store."
)]
pub struct Args {
    #[clap(flatten)]
    store: StoreArgs,

    /// Dataset to build.
    #[clap(long, value_enum, default_value = "all")]
    dataset: Dataset,

    /// Rebuild even if an index already exists, parsing the raw source again
    /// instead of the intermediate JSON when it is present.
    #[clap(short = 'f', long)]
    force: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("No source found for the {0} dataset.")]
    MissingSource(&'static str),

    #[error("Index building failed: {0}")]
    Pitchdic(#[from] PitchdicError),
}

fn print_report(name: &'static str, report: &BuildReport) -> Result<(), BuildError> {
    let unit = if name == "dictionary" { "keys" } else { "rows" };
    match report.stage {
        BuildStage::Missing => return Err(BuildError::MissingSource(name)),
        BuildStage::Index => {
            println!("The {name} index already exists ({} {unit}). Use --force to rebuild.", report.len);
        }
        BuildStage::Intermediate | BuildStage::Raw => {
            let from = if report.stage == BuildStage::Raw {
                "raw source"
            } else {
                "intermediate JSON"
            };
            println!("Built the {name} index from the {from} ({} {unit}).", report.len);
            match &report.persisted {
                Some(path) => println!("Successfully wrote the {name} index to {}", path.display()),
                None => println!("Warning: the {name} index could not be persisted."),
            }
        }
    }
    Ok(())
}

pub fn run(args: Args) -> Result<(), BuildError> {
    let store = LexicalStore::new(args.store.to_config());

    if matches!(args.dataset, Dataset::Dictionary | Dataset::All) {
        println!("Building the dictionary index...");
        let report = store.build_dictionary(args.force)?;
        print_report("dictionary", &report)?;
    }
    if matches!(args.dataset, Dataset::Pitch | Dataset::All) {
        println!("Building the pitch-accent index...");
        let report = store.build_pitch(args.force)?;
        print_report("pitch-accent", &report)?;
    }
    Ok(())
}
