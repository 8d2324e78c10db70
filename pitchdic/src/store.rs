//! Lexical data store.
//!
//! Two independent datasets, a gloss dictionary and a pitch-accent database,
//! each pass through the same stages: raw source → intermediate JSON →
//! persisted rkyv index → in-memory lookup cache. A dataset is built at most
//! once per [`LexicalStore`], on its first lookup.
mod archive;
mod cache;
mod config;
mod gloss;
mod pitch;

use std::fs::File;
use std::io::{BufReader, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use log::{debug, info, warn};
use rkyv::api::high::{HighSerializer, HighValidator};
use rkyv::bytecheck::CheckBytes;
use rkyv::rancor::Error;
use rkyv::ser::allocator::ArenaHandle;
use rkyv::util::AlignedVec;
use rkyv::Archive;

use crate::diagram::{self, VectorDiagram};
use crate::errors::{PitchdicError, Result};
use crate::kanji::{KanjiBlock, KanjiInfoTable};
use crate::pattern::to_letters;

pub use archive::LoadMode;
pub use cache::CacheStats;
pub use config::{SourcePaths, StoreConfig};
pub use gloss::{parse_jmdict, ArchivedDictionaryEntry, DictionaryEntry, GlossIndex, GlossSource};
pub use pitch::{
    parse_pitch_source, pitch_entries, unique_pitch_patterns, ArchivedPitchRecord, PitchEntry,
    PitchIndex, PitchLookup, PitchRecord, PitchSourceEntry,
};

use archive::MappedIndex;
use cache::LookupCache;
use gloss::GlossView;
use pitch::PitchView;

/// A dataset that can be built from its sources and persisted.
pub(crate) trait Dataset:
    Sized + Archive + for<'a> rkyv::Serialize<HighSerializer<AlignedVec, ArenaHandle<'a>, Error>>
{
    /// The normalized form stored as intermediate JSON.
    type Source: serde::Serialize + serde::de::DeserializeOwned;

    /// Name used in log messages.
    const NAME: &'static str;

    /// Magic bytes of the persisted index.
    const MAGIC: &'static [u8];

    fn parse_raw<R: Read>(rdr: R) -> Result<Self::Source>;

    fn from_source(source: Self::Source) -> Result<Self>;
}

/// A dataset either mapped from its persisted index or held in memory.
pub(crate) enum Table<T>
where
    T: Archive,
    T::Archived: 'static,
{
    Archived(MappedIndex<T>),
    Owned(T),
}

impl Table<GlossIndex> {
    fn lookup(&self, key: &str) -> Vec<DictionaryEntry> {
        match self {
            Self::Archived(index) => index.lookup(key),
            Self::Owned(index) => index.lookup(key),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Archived(index) => index.num_keys(),
            Self::Owned(index) => index.num_keys(),
        }
    }
}

impl Table<PitchIndex> {
    fn matching_rows(&self, word: &str) -> Vec<PitchRecord> {
        match self {
            Self::Archived(index) => index.matching_rows(word),
            Self::Owned(index) => index.matching_rows(word),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::Archived(index) => index.num_rows(),
            Self::Owned(index) => index.num_rows(),
        }
    }
}

/// The stage a dataset was loaded from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BuildStage {
    /// A persisted index was opened.
    Index,
    /// The index was built from the intermediate JSON.
    Intermediate,
    /// The index was built from the raw source.
    Raw,
    /// No source exists; the dataset is empty.
    Missing,
}

/// Outcome of building one dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BuildReport {
    /// The stage the dataset was loaded from.
    pub stage: BuildStage,

    /// Where the index was persisted, if it was written.
    pub persisted: Option<PathBuf>,

    /// Number of keys (dictionary) or rows (pitch) in the dataset.
    pub len: usize,
}

struct Built<T>
where
    T: Archive,
    T::Archived: 'static,
{
    stage: BuildStage,
    persisted: Option<PathBuf>,
    table: Option<Table<T>>,
}

fn open_raw(path: &Path) -> Result<Option<Box<dyn Read>>> {
    if path.is_file() {
        return Ok(Some(Box::new(BufReader::new(File::open(path)?))));
    }
    let mut zst = path.as_os_str().to_owned();
    zst.push(".zst");
    let zst = PathBuf::from(zst);
    if zst.is_file() {
        let decoder = zstd::Decoder::new(File::open(&zst)?)?;
        return Ok(Some(Box::new(decoder)));
    }
    Ok(None)
}

/// Reads the intermediate JSON, or parses the raw source when there is none.
/// With `prefer_raw`, an existing raw source wins over the intermediate JSON.
fn read_source<T: Dataset>(
    config: &StoreConfig,
    paths: &SourcePaths,
    prefer_raw: bool,
) -> Result<Option<(BuildStage, T::Source)>> {
    let intermediate = config.intermediate_path(paths);
    let raw = config.raw_path(paths);
    let raw_rdr = if prefer_raw { open_raw(&raw)? } else { None };

    if raw_rdr.is_none() && intermediate.is_file() {
        debug!("[pitchdic] Loading {} from {}", T::NAME, intermediate.display());
        let rdr = BufReader::new(File::open(&intermediate)?);
        return Ok(Some((BuildStage::Intermediate, serde_json::from_reader(rdr)?)));
    }

    let rdr = match raw_rdr {
        Some(rdr) => rdr,
        None => match open_raw(&raw)? {
            Some(rdr) => rdr,
            None => return Ok(None),
        },
    };
    debug!("[pitchdic] Parsing {} from {}", T::NAME, raw.display());
    let source = T::parse_raw(rdr)?;

    if config.persist_intermediate
        && let Err(e) = write_intermediate(&source, &intermediate)
    {
        warn!(
            "[pitchdic] Failed to write {}: {}",
            intermediate.display(),
            e
        );
    }
    Ok(Some((BuildStage::Raw, source)))
}

fn write_intermediate<S: serde::Serialize>(source: &S, path: &Path) -> Result<()> {
    let wtr = BufWriter::new(File::create(path)?);
    serde_json::to_writer(wtr, source)?;
    Ok(())
}

/// Persists an index to the primary location, or to the fallback location
/// when the primary one is not writable.
fn persist<T: Dataset>(config: &StoreConfig, paths: &SourcePaths, index: &T) -> Result<PathBuf> {
    let primary = config.index_path(paths);
    match archive::persist_index(index, T::MAGIC, &primary) {
        Ok(()) => Ok(primary),
        Err(PitchdicError::Io(e)) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            let Some(fallback) = config.fallback_index_path(paths) else {
                return Err(PitchdicError::Io(e));
            };
            warn!(
                "[pitchdic] Permission denied for {}. Falling back to {}",
                primary.display(),
                fallback.display()
            );
            archive::persist_index(index, T::MAGIC, &fallback)?;
            Ok(fallback)
        }
        Err(e) => Err(e),
    }
}

fn build_dataset<T>(config: &StoreConfig, paths: &SourcePaths, force: bool) -> Result<Built<T>>
where
    T: Dataset,
    T::Archived: 'static + for<'a> CheckBytes<HighValidator<'a, Error>>,
{
    if !force && let Some(path) = config.existing_index_path(paths) {
        debug!("[pitchdic] Opening {} index {}", T::NAME, path.display());
        match archive::open_index::<T>(&path, T::MAGIC, config.load_mode) {
            Ok(index) => {
                return Ok(Built {
                    stage: BuildStage::Index,
                    persisted: None,
                    table: Some(Table::Archived(index)),
                });
            }
            Err(e) => warn!(
                "[pitchdic] Failed to open {} index {}, rebuilding it: {}",
                T::NAME,
                path.display(),
                e
            ),
        }
    }

    let Some((stage, source)) = read_source::<T>(config, paths, force)? else {
        debug!("[pitchdic] No {} source under {}", T::NAME, config.data_dir.display());
        return Ok(Built {
            stage: BuildStage::Missing,
            persisted: None,
            table: None,
        });
    };
    let index = T::from_source(source)?;

    let persisted = match persist(config, paths, &index) {
        Ok(path) => {
            info!("[pitchdic] Wrote {} index to {}", T::NAME, path.display());
            Some(path)
        }
        Err(e) => {
            warn!("[pitchdic] Failed to persist {} index, serving it from memory: {}", T::NAME, e);
            None
        }
    };
    Ok(Built {
        stage,
        persisted,
        table: Some(Table::Owned(index)),
    })
}

/// Loads a dataset for lookups. Failures leave the dataset empty.
fn load_dataset<T>(config: &StoreConfig, paths: &SourcePaths) -> Option<Table<T>>
where
    T: Dataset,
    T::Archived: 'static + for<'a> CheckBytes<HighValidator<'a, Error>>,
{
    match build_dataset::<T>(config, paths, false) {
        Ok(built) => built.table,
        Err(e) => {
            warn!("[pitchdic] Failed to load {}: {}", T::NAME, e);
            None
        }
    }
}

/// A pitch-accent diagram of one reading and pattern.
#[derive(Clone, Debug, PartialEq)]
pub struct PitchDiagram {
    /// The reading and pattern drawn.
    pub entry: PitchEntry,

    /// The diagram.
    pub diagram: VectorDiagram,
}

/// Dictionary and pitch-accent lookups backed by lazily-built indexes.
///
/// Lookups never fail: a missing or unreadable dataset behaves as empty.
/// Every result is cached by the exact query string for the lifetime of the
/// store.
///
/// # Examples
///
/// ```
/// use pitchdic::store::{LexicalStore, StoreConfig};
///
/// let dir = std::env::temp_dir().join("pitchdic-doc-empty");
/// let store = LexicalStore::new(StoreConfig::new(&dir).allow_fallback(false));
///
/// assert!(store.lookup_dictionary("箸").is_empty());
/// assert!(store.lookup_pitch("箸").is_empty());
/// ```
pub struct LexicalStore {
    config: StoreConfig,
    gloss: OnceLock<Option<Table<GlossIndex>>>,
    pitch: OnceLock<Option<Table<PitchIndex>>>,
    kanji_info: OnceLock<KanjiInfoTable>,
    gloss_cache: LookupCache<Arc<[DictionaryEntry]>>,
    pitch_cache: LookupCache<Arc<[PitchRecord]>>,
}

impl LexicalStore {
    /// Creates a store. Nothing is read until the first lookup.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            config,
            gloss: OnceLock::new(),
            pitch: OnceLock::new(),
            kanji_info: OnceLock::new(),
            gloss_cache: LookupCache::default(),
            pitch_cache: LookupCache::default(),
        }
    }

    /// Gets the configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    fn gloss(&self) -> Option<&Table<GlossIndex>> {
        self.gloss
            .get_or_init(|| load_dataset(&self.config, &self.config.dictionary))
            .as_ref()
    }

    fn pitch(&self) -> Option<&Table<PitchIndex>> {
        self.pitch
            .get_or_init(|| load_dataset(&self.config, &self.config.pitch))
            .as_ref()
    }

    /// Gets the dictionary entries registered under `word`.
    pub fn lookup_dictionary(&self, word: &str) -> Vec<DictionaryEntry> {
        self.gloss_cache
            .get_or_insert_with(word, || {
                self.gloss()
                    .map(|table| table.lookup(word))
                    .unwrap_or_default()
                    .into()
            })
            .to_vec()
    }

    fn pitch_records(&self, word: &str) -> Arc<[PitchRecord]> {
        self.pitch_cache.get_or_insert_with(word, || {
            self.pitch()
                .map(|table| table.matching_rows(word))
                .unwrap_or_default()
                .into()
        })
    }

    /// Gets the pitch-accent data of `word`.
    ///
    /// An absent word yields an empty [`PitchLookup`].
    pub fn lookup_pitch(&self, word: &str) -> PitchLookup {
        PitchLookup::from_records(&self.pitch_records(word))
    }

    /// Gets the distinct `(kana, pattern)` pairs of `word`.
    pub fn pitch_entries(&self, word: &str) -> Vec<PitchEntry> {
        pitch_entries(&self.pitch_records(word))
    }

    /// Renders one diagram per distinct reading and pattern alternative of
    /// `word`.
    ///
    /// Numeric patterns are rewritten into letters before rendering.
    pub fn pitch_diagrams(&self, word: &str) -> Vec<PitchDiagram> {
        unique_pitch_patterns(&self.pitch_entries(word))
            .into_iter()
            .map(|entry| {
                let diagram = diagram::render(&entry.kana, &to_letters(&entry.pattern));
                PitchDiagram { entry, diagram }
            })
            .collect()
    }

    /// Gets information on each kanji of `word`.
    ///
    /// The table is read on first use; a missing or unreadable table behaves
    /// as empty.
    pub fn kanji_blocks(&self, word: &str) -> Vec<KanjiBlock> {
        self.kanji_info
            .get_or_init(|| {
                let path = self.config.kanji_info_path();
                if !path.is_file() {
                    return KanjiInfoTable::default();
                }
                KanjiInfoTable::from_path(&path).unwrap_or_else(|e| {
                    warn!("[pitchdic] Failed to read {}: {}", path.display(), e);
                    KanjiInfoTable::default()
                })
            })
            .blocks(word)
    }

    /// Builds the dictionary index.
    ///
    /// Without `force`, an existing index is opened instead of rebuilt, and
    /// the intermediate JSON is preferred over the raw source. With `force`,
    /// the raw source is parsed again when present. An index that cannot be
    /// opened is rebuilt from the sources. The built dataset serves this
    /// store's lookups unless they already loaded one.
    ///
    /// # Errors
    ///
    /// Errors reading sources or opening the index are returned. A failure to
    /// persist is reported through [`BuildReport::persisted`] being `None`.
    pub fn build_dictionary(&self, force: bool) -> Result<BuildReport> {
        let built = build_dataset::<GlossIndex>(&self.config, &self.config.dictionary, force)?;
        let len = built.table.as_ref().map_or(0, |table| table.len());
        let _ = self.gloss.set(built.table);
        Ok(BuildReport {
            stage: built.stage,
            persisted: built.persisted,
            len,
        })
    }

    /// Builds the pitch-accent index.
    ///
    /// See [`build_dictionary`](Self::build_dictionary).
    pub fn build_pitch(&self, force: bool) -> Result<BuildReport> {
        let built = build_dataset::<PitchIndex>(&self.config, &self.config.pitch, force)?;
        let len = built.table.as_ref().map_or(0, |table| table.len());
        let _ = self.pitch.set(built.table);
        Ok(BuildReport {
            stage: built.stage,
            persisted: built.persisted,
            len,
        })
    }

    /// Number of keys in the dictionary, loading it if needed.
    pub fn num_dictionary_keys(&self) -> usize {
        self.gloss().map_or(0, |table| table.len())
    }

    /// Number of rows in the pitch-accent database, loading it if needed.
    pub fn num_pitch_rows(&self) -> usize {
        self.pitch().map_or(0, |table| table.len())
    }

    /// Gets the counters of the dictionary lookup cache.
    pub fn dictionary_cache_stats(&self) -> CacheStats {
        self.gloss_cache.stats()
    }

    /// Gets the counters of the pitch-accent lookup cache.
    pub fn pitch_cache_stats(&self) -> CacheStats {
        self.pitch_cache.stats()
    }
}
