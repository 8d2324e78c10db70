//! Gloss dictionary: headword → dictionary entries.
use std::collections::BTreeMap;
use std::io::Read;

use hashbrown::HashMap;
use rkyv::{Archive, Deserialize, Serialize};

use crate::errors::Result;
use crate::store::Dataset;

/// Normalized form of the gloss dictionary, keyed by every kanji spelling and
/// kana reading of each entry.
pub type GlossSource = BTreeMap<String, Vec<DictionaryEntry>>;

/// One dictionary entry.
#[derive(
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    Archive,
    Serialize,
    Deserialize,
    serde::Serialize,
    serde::Deserialize,
)]
#[serde(default)]
pub struct DictionaryEntry {
    /// Kanji spellings in source order.
    #[serde(rename = "kanjis")]
    pub kanji: Vec<String>,

    /// Kana readings in source order.
    #[serde(rename = "kanas")]
    pub kana: Vec<String>,

    /// One string per sense, the sense's glosses joined by `"; "`.
    #[serde(rename = "meanings")]
    pub glosses: Vec<String>,
}

impl ArchivedDictionaryEntry {
    /// Converts the archived entry into an owned one.
    pub fn to_native(&self) -> DictionaryEntry {
        DictionaryEntry {
            kanji: self.kanji.iter().map(|s| s.as_str().to_string()).collect(),
            kana: self.kana.iter().map(|s| s.as_str().to_string()).collect(),
            glosses: self.glosses.iter().map(|s| s.as_str().to_string()).collect(),
        }
    }
}

/// Persisted gloss index.
#[derive(Default, Archive, Serialize, Deserialize)]
pub struct GlossIndex {
    entries: HashMap<String, Vec<DictionaryEntry>>,
}

impl GlossIndex {
    /// Builds the index, replacing earlier values of a repeated key.
    pub fn from_entries(source: GlossSource) -> Self {
        let mut entries = HashMap::with_capacity(source.len());
        for (key, list) in source {
            entries.insert(key, list);
        }
        Self { entries }
    }
}

/// Read access shared by the owned and the archived index.
pub(crate) trait GlossView {
    fn lookup(&self, key: &str) -> Vec<DictionaryEntry>;
    fn num_keys(&self) -> usize;
}

impl GlossView for GlossIndex {
    fn lookup(&self, key: &str) -> Vec<DictionaryEntry> {
        self.entries.get(key).cloned().unwrap_or_default()
    }

    fn num_keys(&self) -> usize {
        self.entries.len()
    }
}

impl GlossView for ArchivedGlossIndex {
    fn lookup(&self, key: &str) -> Vec<DictionaryEntry> {
        self.entries
            .get(key)
            .map(|list| list.iter().map(ArchivedDictionaryEntry::to_native).collect())
            .unwrap_or_default()
    }

    fn num_keys(&self) -> usize {
        self.entries.len()
    }
}

impl Dataset for GlossIndex {
    type Source = GlossSource;

    const NAME: &'static str = "dictionary";
    const MAGIC: &'static [u8] = b"PitchdicGloss 0.1\n";

    fn parse_raw<R: Read>(mut rdr: R) -> Result<Self::Source> {
        let mut xml = String::new();
        rdr.read_to_string(&mut xml)?;
        parse_jmdict(&xml)
    }

    fn from_source(source: Self::Source) -> Result<Self> {
        Ok(Self::from_entries(source))
    }
}

/// Parses a JMdict-style XML document.
///
/// Every `<entry>` yields one [`DictionaryEntry`] registered under each of its
/// `<keb>` and `<reb>` texts. Internal DTD entity declarations are allowed.
///
/// # Errors
///
/// [`PitchdicError::Xml`](crate::errors::PitchdicError::Xml) is returned when
/// the document is not well-formed.
pub fn parse_jmdict(xml: &str) -> Result<GlossSource> {
    let mut opts = roxmltree::ParsingOptions::default();
    opts.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(xml, opts)?;

    let mut source = GlossSource::new();
    for entry in doc
        .root_element()
        .children()
        .filter(|n| n.has_tag_name("entry"))
    {
        let kanji = element_texts(entry, "k_ele", "keb");
        let kana = element_texts(entry, "r_ele", "reb");
        let glosses = entry
            .children()
            .filter(|n| n.has_tag_name("sense"))
            .filter_map(|sense| {
                let glosses: Vec<&str> = sense
                    .children()
                    .filter(|n| n.has_tag_name("gloss"))
                    .filter_map(|g| g.text())
                    .filter(|t| !t.is_empty())
                    .collect();
                (!glosses.is_empty()).then(|| glosses.join("; "))
            })
            .collect();

        let entry = DictionaryEntry {
            kanji,
            kana,
            glosses,
        };
        let mut seen: Vec<&String> = Vec::new();
        for key in entry.kanji.iter().chain(entry.kana.iter()) {
            // A spelling listed twice registers the entry once.
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);
            source.entry(key.clone()).or_default().push(entry.clone());
        }
    }
    Ok(source)
}

fn element_texts(entry: roxmltree::Node, group: &str, leaf: &str) -> Vec<String> {
    entry
        .children()
        .filter(|n| n.has_tag_name(group))
        .flat_map(|g| g.children().filter(|n| n.has_tag_name(leaf)))
        .filter_map(|n| n.text())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const JMDICT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<!DOCTYPE JMdict [
<!ENTITY n "noun (common) (futsuumeishi)">
]>
<JMdict>
<entry>
<ent_seq>1</ent_seq>
<k_ele><keb>箸</keb></k_ele>
<r_ele><reb>はし</reb></r_ele>
<sense><pos>&n;</pos><gloss>chopsticks</gloss></sense>
</entry>
<entry>
<ent_seq>2</ent_seq>
<k_ele><keb>橋</keb></k_ele>
<k_ele><keb>槗</keb></k_ele>
<r_ele><reb>はし</reb></r_ele>
<sense><gloss>bridge</gloss><gloss>span</gloss></sense>
<sense><gloss></gloss></sense>
</entry>
</JMdict>
"#;

    #[test]
    fn test_parse_jmdict() {
        let source = parse_jmdict(JMDICT).unwrap();
        assert_eq!(source.len(), 4);

        let hashi = &source["はし"];
        assert_eq!(hashi.len(), 2);
        assert_eq!(hashi[0].glosses, ["chopsticks"]);
        assert_eq!(hashi[1].kanji, ["橋", "槗"]);
        assert_eq!(hashi[1].glosses, ["bridge; span"]);
        assert_eq!(source["槗"], source["橋"]);
    }

    #[test]
    fn test_parse_jmdict_repeated_spelling() {
        let xml = "<JMdict><entry>\
            <k_ele><keb>カナ</keb></k_ele>\
            <r_ele><reb>カナ</reb></r_ele><r_ele><reb>かな</reb></r_ele>\
            <sense><gloss>kana</gloss></sense>\
            </entry></JMdict>";
        let source = parse_jmdict(xml).unwrap();
        assert_eq!(source["カナ"].len(), 1);
        assert_eq!(source["かな"], source["カナ"]);
    }

    #[test]
    fn test_parse_jmdict_malformed() {
        assert!(parse_jmdict("<JMdict><entry></JMdict>").is_err());
    }

    #[test]
    fn test_intermediate_field_names() {
        let source = parse_jmdict(JMDICT).unwrap();
        let json = serde_json::to_string(&source["箸"]).unwrap();
        assert_eq!(
            json,
            r#"[{"kanjis":["箸"],"kanas":["はし"],"meanings":["chopsticks"]}]"#
        );

        let parsed: GlossSource =
            serde_json::from_str(r#"{"猫":[{"kanas":["ねこ"],"meanings":["cat"]}]}"#).unwrap();
        assert!(parsed["猫"][0].kanji.is_empty());
    }

    #[test]
    fn test_archived_lookup() {
        let index = GlossIndex::from_entries(parse_jmdict(JMDICT).unwrap());
        let bytes = rkyv::to_bytes::<rkyv::rancor::Error>(&index).unwrap();
        let archived =
            rkyv::access::<ArchivedGlossIndex, rkyv::rancor::Error>(&bytes).unwrap();

        assert_eq!(archived.num_keys(), 4);
        assert_eq!(archived.lookup("橋"), index.lookup("橋"));
        assert!(archived.lookup("犬").is_empty());
    }
}
