//! Locations and options of a [`LexicalStore`](super::LexicalStore).
use std::path::PathBuf;

use crate::store::archive::LoadMode;

/// Name of the directory used under the user cache directory.
const FALLBACK_DIR_NAME: &str = "pitchdic";

/// File names of the three stages of one dataset.
///
/// Raw and intermediate files are resolved against the data directory; the
/// index file against the index directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourcePaths {
    /// The raw source as distributed (XML or delimited text). A file with an
    /// additional `.zst` extension is accepted in its place.
    pub raw: PathBuf,

    /// The normalized JSON written after parsing the raw source.
    pub intermediate: PathBuf,

    /// The persisted rkyv index.
    pub index: PathBuf,
}

impl SourcePaths {
    /// Creates a new instance.
    pub fn new<R, J, I>(raw: R, intermediate: J, index: I) -> Self
    where
        R: Into<PathBuf>,
        J: Into<PathBuf>,
        I: Into<PathBuf>,
    {
        Self {
            raw: raw.into(),
            intermediate: intermediate.into(),
            index: index.into(),
        }
    }

    /// Default files of the gloss dictionary.
    pub fn dictionary() -> Self {
        Self::new(
            "JMdict_e_examp.XML",
            "JMdict_e_examp.json",
            "JMdict_e_examp.idx",
        )
    }

    /// Default files of the pitch-accent database.
    pub fn pitch() -> Self {
        Self::new("wadoku_pitchdb.csv", "wadoku_pitchdb.json", "wadoku_pitchdb.idx")
    }
}

/// Configuration of a [`LexicalStore`](super::LexicalStore).
///
/// # Examples
///
/// ```
/// use pitchdic::store::{LoadMode, StoreConfig};
///
/// let config = StoreConfig::new("data")
///     .index_dir("cache")
///     .load_mode(LoadMode::TrustCache)
///     .persist_intermediate(false);
/// assert_eq!(
///     config.index_path(&config.pitch),
///     std::path::Path::new("cache/wadoku_pitchdb.idx"),
/// );
/// ```
#[derive(Clone, Debug)]
pub struct StoreConfig {
    /// Directory holding the raw and intermediate sources.
    pub data_dir: PathBuf,

    /// Directory for persisted indexes. Defaults to `data_dir`.
    pub index_dir: Option<PathBuf>,

    /// Files of the gloss dictionary.
    pub dictionary: SourcePaths,

    /// Files of the pitch-accent database.
    pub pitch: SourcePaths,

    /// Name of the kanji information table in `data_dir`.
    pub kanji_info: PathBuf,

    /// Falls back to the user cache directory when the index directory is
    /// not writable.
    pub allow_fallback: bool,

    /// Writes the intermediate JSON after parsing a raw source.
    pub persist_intermediate: bool,

    /// Validation strategy for persisted indexes.
    pub load_mode: LoadMode,
}

impl StoreConfig {
    /// Creates a configuration with default file names under `data_dir`.
    pub fn new<P>(data_dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        Self {
            data_dir: data_dir.into(),
            index_dir: None,
            dictionary: SourcePaths::dictionary(),
            pitch: SourcePaths::pitch(),
            kanji_info: PathBuf::from("常用漢字の書き取り.json"),
            allow_fallback: true,
            persist_intermediate: true,
            load_mode: LoadMode::default(),
        }
    }

    /// Sets the directory for persisted indexes.
    pub fn index_dir<P>(mut self, dir: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.index_dir = Some(dir.into());
        self
    }

    /// Sets the files of the gloss dictionary.
    pub fn dictionary_files(mut self, paths: SourcePaths) -> Self {
        self.dictionary = paths;
        self
    }

    /// Sets the files of the pitch-accent database.
    pub fn pitch_files(mut self, paths: SourcePaths) -> Self {
        self.pitch = paths;
        self
    }

    /// Sets the file name of the kanji information table.
    pub fn kanji_info<P>(mut self, path: P) -> Self
    where
        P: Into<PathBuf>,
    {
        self.kanji_info = path.into();
        self
    }

    /// Enables or disables the user cache directory fallback.
    pub fn allow_fallback(mut self, yes: bool) -> Self {
        self.allow_fallback = yes;
        self
    }

    /// Enables or disables writing the intermediate JSON.
    pub fn persist_intermediate(mut self, yes: bool) -> Self {
        self.persist_intermediate = yes;
        self
    }

    /// Sets the validation strategy for persisted indexes.
    pub fn load_mode(mut self, mode: LoadMode) -> Self {
        self.load_mode = mode;
        self
    }

    /// Resolves the raw source of a dataset.
    pub fn raw_path(&self, paths: &SourcePaths) -> PathBuf {
        self.data_dir.join(&paths.raw)
    }

    /// Resolves the intermediate JSON of a dataset.
    pub fn intermediate_path(&self, paths: &SourcePaths) -> PathBuf {
        self.data_dir.join(&paths.intermediate)
    }

    /// Resolves the primary location of a dataset's index.
    pub fn index_path(&self, paths: &SourcePaths) -> PathBuf {
        self.index_dir
            .as_deref()
            .unwrap_or(&self.data_dir)
            .join(&paths.index)
    }

    /// Resolves the fallback location of a dataset's index, if enabled.
    pub fn fallback_index_path(&self, paths: &SourcePaths) -> Option<PathBuf> {
        if !self.allow_fallback {
            return None;
        }
        let file_name = paths.index.file_name()?;
        dirs::cache_dir().map(|dir| dir.join(FALLBACK_DIR_NAME).join(file_name))
    }

    /// Finds a persisted index, trying the primary location first.
    pub(crate) fn existing_index_path(&self, paths: &SourcePaths) -> Option<PathBuf> {
        let primary = self.index_path(paths);
        if primary.is_file() {
            return Some(primary);
        }
        self.fallback_index_path(paths).filter(|p| p.is_file())
    }

    /// Resolves the kanji information table.
    pub fn kanji_info_path(&self) -> PathBuf {
        self.data_dir.join(&self.kanji_info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::path::Path;

    #[test]
    fn test_default_paths() {
        let config = StoreConfig::new("/data");
        assert_eq!(
            config.raw_path(&config.dictionary),
            Path::new("/data/JMdict_e_examp.XML")
        );
        assert_eq!(
            config.intermediate_path(&config.pitch),
            Path::new("/data/wadoku_pitchdb.json")
        );
        assert_eq!(
            config.index_path(&config.pitch),
            Path::new("/data/wadoku_pitchdb.idx")
        );
        assert!(config.persist_intermediate);
        assert_eq!(config.load_mode, LoadMode::Validate);
    }

    #[test]
    fn test_index_dir_override() {
        let config = StoreConfig::new("/data").index_dir("/var/cache/idx");
        assert_eq!(
            config.index_path(&config.dictionary),
            Path::new("/var/cache/idx/JMdict_e_examp.idx")
        );
    }

    #[test]
    fn test_fallback_disabled() {
        let config = StoreConfig::new("/data").allow_fallback(false);
        assert!(config.fallback_index_path(&config.pitch).is_none());
    }
}
