//! Per-kanji information table.
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hashbrown::HashMap;
use serde_json::{Map, Value};

use crate::common::is_kanji;
use crate::errors::Result;

/// Maximum number of related words kept per kanji.
pub const MAX_RELATED_WORDS: usize = 20;

/// Information on one kanji.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KanjiBlock {
    /// The kanji.
    pub kanji: char,

    /// On readings.
    pub reading_on: String,

    /// Kun readings.
    pub reading_kun: String,

    /// Stroke count.
    pub strokes: String,

    /// Radical.
    pub radical: String,

    /// Meaning.
    pub meaning: String,

    /// Kanji kentei level.
    pub kanken_level: String,

    /// Stroke order.
    pub stroke_order: String,

    /// Reading of the radical.
    pub radical_reading: String,

    /// Notes on the radical.
    pub radical_information: String,

    /// Related words, at most [`MAX_RELATED_WORDS`].
    pub related_words: Vec<String>,
}

impl KanjiBlock {
    fn from_object(kanji: char, obj: &Map<String, Value>) -> Self {
        let field = |name: &str| match obj.get(name) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => String::new(),
            Some(v) => v.to_string(),
        };
        Self {
            kanji,
            reading_on: field("reading_on"),
            reading_kun: field("reading_kun"),
            strokes: field("number_of_strokes"),
            radical: field("radical"),
            meaning: field("meaning"),
            kanken_level: field("kanken_level"),
            stroke_order: field("stroke_order"),
            radical_reading: field("radical_reading"),
            radical_information: field("radical_information"),
            related_words: field("related_words")
                .split(',')
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .take(MAX_RELATED_WORDS)
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Table of kanji information read from a JSON array of objects keyed by
/// `"kanji"`.
#[derive(Clone, Debug, Default)]
pub struct KanjiInfoTable {
    blocks: HashMap<char, KanjiBlock>,
}

impl KanjiInfoTable {
    /// Reads the table from a reader.
    ///
    /// Objects whose `"kanji"` is not a single character are ignored; of
    /// repeated kanji the first object wins.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let objects: Vec<Map<String, Value>> = serde_json::from_reader(rdr)?;
        let mut blocks = HashMap::with_capacity(objects.len());
        for obj in &objects {
            let Some(Value::String(kanji)) = obj.get("kanji") else {
                continue;
            };
            let mut chars = kanji.chars();
            if let (Some(c), None) = (chars.next(), chars.next()) {
                blocks
                    .entry(c)
                    .or_insert_with(|| KanjiBlock::from_object(c, obj));
            }
        }
        Ok(Self { blocks })
    }

    /// Reads the table from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Number of kanji in the table.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Returns `true` if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Gets the block of each kanji of `word`, in order. Other characters and
    /// kanji absent from the table are skipped.
    pub fn blocks(&self, word: &str) -> Vec<KanjiBlock> {
        word.chars()
            .filter(|&c| is_kanji(c))
            .filter_map(|c| self.blocks.get(&c).cloned())
            .collect()
    }
}
