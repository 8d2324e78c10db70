//! Example sentences supplied by the host.
//!
//! The library never fetches sentences itself; a host injects an
//! [`ExampleSentenceProvider`].
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use hashbrown::HashMap;
use serde::Deserialize;

use crate::errors::Result;

/// Example sentences and related words of a word.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExampleLookup {
    /// Pairs of a Japanese sentence and its translation.
    pub examples: Vec<(String, String)>,

    /// Pairs of a related word and its translation.
    pub related_words: Vec<(String, String)>,
}

/// A source of example sentences.
pub trait ExampleSentenceProvider: Send + Sync {
    /// Gets the examples of `word`. An unknown word yields an empty lookup.
    fn lookup(&self, word: &str) -> ExampleLookup;
}

/// A provider without any sentence.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoExamples;

impl ExampleSentenceProvider for NoExamples {
    fn lookup(&self, _word: &str) -> ExampleLookup {
        ExampleLookup::default()
    }
}

/// A provider reading a local JSON cache of the form
/// `{ word: { "examples": [[jp, en], ...], "related_words": [[word, en], ...] } }`.
#[derive(Clone, Debug, Default)]
pub struct JsonExampleSentences {
    db: HashMap<String, ExampleLookup>,
}

impl JsonExampleSentences {
    /// Reads the cache from a reader.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let db = serde_json::from_reader(rdr)?;
        Ok(Self { db })
    }

    /// Reads the cache from a file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Number of cached words.
    pub fn len(&self) -> usize {
        self.db.len()
    }

    /// Returns `true` if no word is cached.
    pub fn is_empty(&self) -> bool {
        self.db.is_empty()
    }
}

impl ExampleSentenceProvider for JsonExampleSentences {
    fn lookup(&self, word: &str) -> ExampleLookup {
        self.db.get(word).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CACHE: &str = r#"{
  "箸": {
    "examples": [["箸を使う。", "I use chopsticks."]],
    "related_words": [["割り箸", "disposable chopsticks"]]
  },
  "橋": {}
}"#;

    #[test]
    fn test_json_examples() {
        let provider = JsonExampleSentences::from_reader(CACHE.as_bytes()).unwrap();
        assert_eq!(provider.len(), 2);

        let lookup = provider.lookup("箸");
        assert_eq!(
            lookup.examples,
            [("箸を使う。".to_string(), "I use chopsticks.".to_string())]
        );
        assert_eq!(lookup.related_words[0].0, "割り箸");
        assert_eq!(provider.lookup("橋"), ExampleLookup::default());
        assert_eq!(provider.lookup("犬"), ExampleLookup::default());
    }

    #[test]
    fn test_no_examples() {
        let provider: &dyn ExampleSentenceProvider = &NoExamples;
        assert_eq!(provider.lookup("箸"), ExampleLookup::default());
    }

    #[test]
    fn test_corrupt_cache() {
        assert!(JsonExampleSentences::from_reader("[1, 2".as_bytes()).is_err());
    }
}
