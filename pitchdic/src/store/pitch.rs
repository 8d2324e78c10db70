//! Pitch-accent database: rows of readings and patterns, indexed by kanji and
//! by kana.
use std::io::{BufRead, BufReader, Read};
use std::sync::LazyLock;

use hashbrown::HashMap;
use log::warn;
use regex::Regex;
use rkyv::{Archive, Archived, Deserialize, Serialize};

use crate::common::{is_kanji, LIST_SEPARATOR, PITCH_RECORD_FIELDS, RECORD_FIELD_SEPARATOR};
use crate::errors::{PitchdicError, Result};
use crate::pattern::alternatives;
use crate::store::Dataset;

static DECORATIONS: LazyLock<Regex> = LazyLock::new(|| Regex::new("[△×…]").unwrap());

/// One line of the pitch-accent source after cleaning.
///
/// This is also the element type of the intermediate JSON array.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct PitchSourceEntry {
    /// Kanji spellings.
    pub kanji_list: Vec<String>,

    /// Plain kana readings.
    pub kana_list: Vec<String>,

    /// Reading with accent marks.
    pub accented_kana: String,

    /// Accent numbers, comma-separated.
    pub pitch_number: String,

    /// H/L pattern, possibly comma-joined alternatives.
    pub pitch_pattern: String,
}

impl PitchSourceEntry {
    /// Parses one line of the source.
    ///
    /// Returns `None` for a malformed line: fewer than five fields, or no
    /// kanji and no kana left after cleaning.
    ///
    /// # Examples
    ///
    /// ```
    /// use pitchdic::store::PitchSourceEntry;
    ///
    /// let entry = PitchSourceEntry::parse_line("△飯␟飯␞いい␞い＼い␞1␞HLL").unwrap();
    /// assert_eq!(entry.kanji_list, ["飯", "飯"]);
    /// assert_eq!(entry.kana_list, ["いい"]);
    /// assert_eq!(entry.pitch_pattern, "HLL");
    /// ```
    pub fn parse_line(line: &str) -> Option<Self> {
        let fields: Vec<&str> = line.trim().split(RECORD_FIELD_SEPARATOR).collect();
        if fields.len() < PITCH_RECORD_FIELDS {
            return None;
        }
        let entry = Self {
            kanji_list: split_list(fields[0]),
            kana_list: split_list(fields[1]),
            accented_kana: fields[2].to_string(),
            pitch_number: fields[3].to_string(),
            pitch_pattern: fields[4].to_string(),
        };
        (!entry.is_malformed()).then_some(entry)
    }

    #[inline(always)]
    fn is_malformed(&self) -> bool {
        self.kanji_list.is_empty() && self.kana_list.is_empty()
    }

    /// Expands the entry to one record per (kanji, kana) pair.
    ///
    /// An empty list stands for a single empty key.
    fn records(&self) -> Vec<PitchRecord> {
        let empty = [String::new()];
        let kanji_list: &[String] = if self.kanji_list.is_empty() {
            &empty
        } else {
            &self.kanji_list
        };
        let kana_list: &[String] = if self.kana_list.is_empty() {
            &empty
        } else {
            &self.kana_list
        };

        let mut records = Vec::with_capacity(kanji_list.len() * kana_list.len());
        for kanji in kanji_list {
            for kana in kana_list {
                records.push(PitchRecord {
                    kanji: kanji.clone(),
                    kana: kana.clone(),
                    accented_kana: self.accented_kana.clone(),
                    pitch_number: self.pitch_number.clone(),
                    pattern: self.pitch_pattern.clone(),
                });
            }
        }
        records
    }
}

fn split_list(field: &str) -> Vec<String> {
    field
        .split(LIST_SEPARATOR)
        .map(|k| DECORATIONS.replace_all(k, "").into_owned())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Parses the delimited pitch-accent source.
///
/// The first line is a header. Blank lines and lines starting with `//` are
/// skipped; malformed lines, including lines that are not UTF-8, are skipped
/// and counted in a warning.
pub fn parse_pitch_source<R: Read>(rdr: R) -> Result<Vec<PitchSourceEntry>> {
    let mut entries = vec![];
    let mut num_malformed = 0;
    for (i, bytes) in BufReader::new(rdr).split(b'\n').enumerate() {
        let bytes = bytes?;
        if i == 0 {
            continue;
        }
        let Ok(line) = String::from_utf8(bytes) else {
            num_malformed += 1;
            continue;
        };
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        match PitchSourceEntry::parse_line(line) {
            Some(entry) => entries.push(entry),
            None => num_malformed += 1,
        }
    }
    if num_malformed != 0 {
        warn!("[pitchdic] Skipped {num_malformed} malformed pitch-accent lines");
    }
    Ok(entries)
}

/// One row of the pitch-accent index.
#[derive(Clone, Debug, Default, PartialEq, Eq, Archive, Serialize, Deserialize)]
pub struct PitchRecord {
    /// Kanji spelling, possibly empty.
    pub kanji: String,

    /// Plain kana reading, possibly empty.
    pub kana: String,

    /// Reading with accent marks.
    pub accented_kana: String,

    /// Accent numbers, comma-separated.
    pub pitch_number: String,

    /// H/L pattern, possibly comma-joined alternatives.
    pub pattern: String,
}

impl ArchivedPitchRecord {
    /// Converts the archived record into an owned one.
    pub fn to_native(&self) -> PitchRecord {
        PitchRecord {
            kanji: self.kanji.as_str().to_string(),
            kana: self.kana.as_str().to_string(),
            accented_kana: self.accented_kana.as_str().to_string(),
            pitch_number: self.pitch_number.as_str().to_string(),
            pattern: self.pattern.as_str().to_string(),
        }
    }
}

/// Persisted pitch-accent index.
///
/// Rows keep source order; the two maps list row ids in ascending order.
#[derive(Default, Archive, Serialize, Deserialize)]
pub struct PitchIndex {
    rows: Vec<PitchRecord>,
    by_kanji: HashMap<String, Vec<u32>>,
    by_kana: HashMap<String, Vec<u32>>,
}

impl PitchIndex {
    /// Builds the index from cleaned source entries.
    ///
    /// Entries without kanji and kana are skipped.
    pub fn from_entries(entries: &[PitchSourceEntry]) -> Result<Self> {
        let mut index = Self::default();
        for entry in entries.iter().filter(|e| !e.is_malformed()) {
            for record in entry.records() {
                index.push(record)?;
            }
        }
        Ok(index)
    }

    fn push(&mut self, record: PitchRecord) -> Result<()> {
        let id = u32::try_from(self.rows.len()).map_err(|_| {
            PitchdicError::invalid_state("Too many pitch-accent rows", self.rows.len().to_string())
        })?;
        // Empty keys are never queried.
        if !record.kanji.is_empty() {
            self.by_kanji.entry(record.kanji.clone()).or_default().push(id);
        }
        if !record.kana.is_empty() {
            self.by_kana.entry(record.kana.clone()).or_default().push(id);
        }
        self.rows.push(record);
        Ok(())
    }
}

/// Returns `true` if `word` is exactly one CJK unified ideograph.
#[inline(always)]
fn is_single_kanji(word: &str) -> bool {
    let mut chars = word.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if is_kanji(c))
}

fn merge_ids<I, J>(kanji: I, kana: J) -> Vec<u32>
where
    I: Iterator<Item = u32>,
    J: Iterator<Item = u32>,
{
    let mut ids: Vec<u32> = kanji.chain(kana).collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Read access shared by the owned and the archived index.
pub(crate) trait PitchView {
    /// Gets the rows matching `word` in row id order.
    ///
    /// A single kanji matches the kanji column only; anything else matches
    /// either column.
    fn matching_rows(&self, word: &str) -> Vec<PitchRecord>;
    fn num_rows(&self) -> usize;
}

impl PitchView for PitchIndex {
    fn matching_rows(&self, word: &str) -> Vec<PitchRecord> {
        let kanji: &[u32] = self.by_kanji.get(word).map(Vec::as_slice).unwrap_or_default();
        let kana: &[u32] = if is_single_kanji(word) {
            &[]
        } else {
            self.by_kana.get(word).map(Vec::as_slice).unwrap_or_default()
        };
        merge_ids(kanji.iter().copied(), kana.iter().copied())
            .into_iter()
            .filter_map(|id| self.rows.get(id as usize))
            .cloned()
            .collect()
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl PitchView for ArchivedPitchIndex {
    fn matching_rows(&self, word: &str) -> Vec<PitchRecord> {
        let kanji: &[Archived<u32>] = self.by_kanji.get(word).map(|ids| &ids[..]).unwrap_or_default();
        let kana: &[Archived<u32>] = if is_single_kanji(word) {
            &[]
        } else {
            self.by_kana.get(word).map(|ids| &ids[..]).unwrap_or_default()
        };
        merge_ids(
            kanji.iter().map(|id| id.to_native()),
            kana.iter().map(|id| id.to_native()),
        )
        .into_iter()
        .filter_map(|id| self.rows.get(id as usize))
        .map(ArchivedPitchRecord::to_native)
        .collect()
    }

    fn num_rows(&self) -> usize {
        self.rows.len()
    }
}

impl Dataset for PitchIndex {
    type Source = Vec<PitchSourceEntry>;

    const NAME: &'static str = "pitch";
    const MAGIC: &'static [u8] = b"PitchdicAccent 0.1\n";

    fn parse_raw<R: Read>(rdr: R) -> Result<Self::Source> {
        parse_pitch_source(rdr)
    }

    fn from_source(source: Self::Source) -> Result<Self> {
        Self::from_entries(&source)
    }
}

/// Pitch-accent data of a word.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PitchLookup {
    /// Distinct non-empty accented readings in first-seen order.
    pub readings: Vec<String>,

    /// The first accented reading, or an empty string.
    pub accented: String,

    /// The pattern of every matched row, in row order.
    pub patterns: Vec<String>,

    /// The first non-empty plain kana reading, or an empty string.
    pub plain: String,
}

impl PitchLookup {
    /// Summarizes matched rows.
    pub fn from_records(records: &[PitchRecord]) -> Self {
        let mut readings: Vec<String> = vec![];
        for record in records {
            if !record.accented_kana.is_empty() && !readings.contains(&record.accented_kana) {
                readings.push(record.accented_kana.clone());
            }
        }
        Self {
            accented: readings.first().cloned().unwrap_or_default(),
            readings,
            patterns: records.iter().map(|r| r.pattern.clone()).collect(),
            plain: records
                .iter()
                .find(|r| !r.kana.is_empty())
                .map(|r| r.kana.clone())
                .unwrap_or_default(),
        }
    }

    /// Returns `true` if no row matched.
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// A reading paired with one of its patterns.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct PitchEntry {
    /// Plain kana reading.
    pub kana: String,

    /// Reading with accent marks.
    pub accented_kana: String,

    /// H/L pattern.
    pub pattern: String,
}

/// Collects `(kana, pattern)` pairs of matched rows, dropping repeated pairs
/// and keeping first-seen order.
pub fn pitch_entries(records: &[PitchRecord]) -> Vec<PitchEntry> {
    let mut entries: Vec<PitchEntry> = vec![];
    for record in records {
        if entries
            .iter()
            .any(|e| e.kana == record.kana && e.pattern == record.pattern)
        {
            continue;
        }
        entries.push(PitchEntry {
            kana: record.kana.clone(),
            accented_kana: record.accented_kana.clone(),
            pattern: record.pattern.clone(),
        });
    }
    entries
}

/// Splits comma-joined patterns of each entry and deduplicates the resulting
/// `(kana, pattern)` pairs, keeping first-seen order.
///
/// # Examples
///
/// ```
/// use pitchdic::store::{unique_pitch_patterns, PitchEntry};
///
/// let entry = PitchEntry {
///     kana: "はし".into(),
///     accented_kana: String::new(),
///     pattern: "LHL, HLL".into(),
/// };
/// let unique = unique_pitch_patterns(&[entry.clone(), entry]);
/// let patterns: Vec<_> = unique.iter().map(|e| e.pattern.as_str()).collect();
/// assert_eq!(patterns, ["LHL", "HLL"]);
/// ```
pub fn unique_pitch_patterns(entries: &[PitchEntry]) -> Vec<PitchEntry> {
    let mut unique: Vec<PitchEntry> = vec![];
    for entry in entries {
        for pattern in alternatives(&entry.pattern) {
            if unique
                .iter()
                .any(|e| e.kana == entry.kana && e.pattern == pattern)
            {
                continue;
            }
            unique.push(PitchEntry {
                pattern: pattern.to_string(),
                ..entry.clone()
            });
        }
    }
    unique
}
