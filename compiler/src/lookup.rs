use std::path::PathBuf;

use clap::Parser;
use pitchdic::diagram::svg;
use pitchdic::errors::PitchdicError;
use pitchdic::examples::{ExampleSentenceProvider, JsonExampleSentences, NoExamples};
use pitchdic::store::LexicalStore;

use crate::store_args::StoreArgs;

#[derive(Parser, Debug)]
#[clap(
    name = "lookup",
    about = "A program to print glosses and pitch-accent data of a word."
)]
pub struct Args {
    #[clap(flatten)]
    store: StoreArgs,

    /// The word to look up.
    word: String,

    /// Also print the SVG diagram of each reading.
    #[clap(long)]
    svg: bool,

    /// Local example sentence cache (kanji_examples.json).
    #[clap(short = 'e', long, value_name = "FILE_PATH")]
    examples_in: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Failed to read the example sentences: {0}")]
    Pitchdic(#[from] PitchdicError),
}

pub fn run(args: Args) -> Result<(), LookupError> {
    let examples: Box<dyn ExampleSentenceProvider> = match &args.examples_in {
        Some(path) => Box::new(JsonExampleSentences::from_path(path)?),
        None => Box::new(NoExamples),
    };
    let store = LexicalStore::new(args.store.to_config());
    let word = args.word.as_str();

    let pitch = store.lookup_pitch(word);
    let readings = if pitch.readings.is_empty() {
        store
            .lookup_dictionary(word)
            .iter()
            .flat_map(|entry| entry.kana.iter().cloned())
            .collect::<Vec<_>>()
    } else {
        pitch.readings.clone()
    };
    println!("{word}");
    if !readings.is_empty() {
        println!("  readings: {}", readings.join(", "));
    }

    for entry in store.lookup_dictionary(word) {
        println!("  [{}] {}", entry.kanji.join("・"), entry.kana.join("・"));
        for (i, gloss) in entry.glosses.iter().enumerate() {
            println!("    {}. {gloss}", i + 1);
        }
    }

    for diagram in store.pitch_diagrams(word) {
        println!("  pitch: {} {}", diagram.entry.kana, diagram.entry.pattern);
        if args.svg {
            println!("{}", svg::to_svg(&diagram.diagram));
        }
    }

    for block in store.kanji_blocks(word) {
        println!(
            "  {}: on {} / kun {} / {} strokes / {}",
            block.kanji, block.reading_on, block.reading_kun, block.strokes, block.meaning
        );
        if !block.related_words.is_empty() {
            println!("    related: {}", block.related_words.join(", "));
        }
    }

    let lookup = examples.lookup(word);
    for (jp, en) in &lookup.examples {
        println!("  {jp}\n    {en}");
    }
    for (related, en) in &lookup.related_words {
        println!("  {related}: {en}");
    }
    Ok(())
}
