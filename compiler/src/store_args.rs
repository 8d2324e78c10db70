use std::path::PathBuf;

use pitchdic::store::{LoadMode, StoreConfig};

/// Options locating the lexical data.
#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// Directory holding the raw and intermediate sources.
    #[clap(short = 'd', long, value_name = "DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Directory for persisted indexes. Defaults to the data directory.
    #[clap(short = 'i', long, value_name = "INDEX_DIR")]
    pub index_dir: Option<PathBuf>,

    /// Skip validation of indexes whose metadata hash matches.
    #[clap(long)]
    pub trust_cache: bool,

    /// Never write indexes to the user cache directory.
    #[clap(long)]
    pub no_fallback: bool,

    /// Do not write the intermediate JSON after parsing a raw source.
    #[clap(long)]
    pub no_intermediate: bool,
}

impl StoreArgs {
    pub fn to_config(&self) -> StoreConfig {
        let mut config = StoreConfig::new(&self.data_dir)
            .allow_fallback(!self.no_fallback)
            .persist_intermediate(!self.no_intermediate);
        if let Some(index_dir) = &self.index_dir {
            config = config.index_dir(index_dir);
        }
        if self.trust_cache {
            config = config.load_mode(LoadMode::TrustCache);
        }
        config
    }
}
