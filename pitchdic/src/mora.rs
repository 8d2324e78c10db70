//! Segmentation of kana into mora.
use std::fmt;
use std::ops::Deref;

use crate::common::{is_combiner, is_kana};

/// A single mora: one kana, or a kana followed by a small combiner.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Mora(String);

impl Mora {
    /// Gets the text of the mora.
    #[inline(always)]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the mora is a two-character digraph (e.g. `しゅ`).
    #[inline(always)]
    pub fn is_digraph(&self) -> bool {
        self.0.chars().nth(1).is_some()
    }
}

impl Deref for Mora {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for Mora {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Mora {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Removes every character that is not a kana letter or the long-vowel mark.
///
/// Markup, punctuation and accent symbols embedded in readings are dropped
/// silently so that the mora count lines up with the pitch pattern.
pub fn normalize(text: &str) -> String {
    text.chars().filter(|&c| is_kana(c)).collect()
}

/// Splits a kana string into mora after normalizing it.
///
/// # Examples
///
/// ```
/// use pitchdic::mora::segment;
///
/// let mora = segment("しゅんかん");
/// assert_eq!(mora, ["しゅ", "ん", "か", "ん"]);
/// ```
pub fn segment(text: &str) -> Vec<Mora> {
    let normalized = normalize(text);
    MoraIter::new(&normalized).collect()
}

/// Iterator of mora over an already normalized string.
///
/// The iterator holds no state besides its cursor, so it can be recreated
/// from the same input any number of times.
#[derive(Clone, Debug)]
pub struct MoraIter<'a> {
    rest: &'a str,
}

impl<'a> MoraIter<'a> {
    /// Creates an iterator over `normalized`.
    #[inline(always)]
    pub const fn new(normalized: &'a str) -> Self {
        Self { rest: normalized }
    }
}

impl Iterator for MoraIter<'_> {
    type Item = Mora;

    fn next(&mut self) -> Option<Self::Item> {
        let mut chars = self.rest.chars();
        let first = chars.next()?;
        let mut end = first.len_utf8();
        if let Some(second) = chars.next()
            && is_combiner(second)
        {
            end += second.len_utf8();
        }
        let (head, tail) = self.rest.split_at(end);
        self.rest = tail;
        Some(Mora(head.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_digraph() {
        assert_eq!(segment("しゅんかん"), ["しゅ", "ん", "か", "ん"]);
    }

    #[test]
    fn test_segment_empty() {
        assert!(segment("").is_empty());
        assert!(segment("漢字!").is_empty());
    }

    #[test]
    fn test_segment_strips_markup() {
        assert_eq!(segment("<b>は</b>し"), ["は", "し"]);
        assert_eq!(segment("き＼ょう"), ["きょ", "う"]);
    }

    #[test]
    fn test_segment_katakana() {
        assert_eq!(segment("コーヒー"), ["コ", "ー", "ヒ", "ー"]);
        assert_eq!(segment("ジャム"), ["ジャ", "ム"]);
    }

    #[test]
    fn test_segment_is_lossless() {
        for s in ["りょこう", "きゃっきゃ", "アイスコーヒー", "x·ちぇ・ぁ", "ぁぁ"] {
            let joined: String = segment(s).iter().map(Mora::as_str).collect();
            assert_eq!(joined, normalize(s));
        }
    }

    #[test]
    fn test_leading_combiner_stands_alone() {
        // A combiner merges only into a preceding character.
        assert_eq!(segment("ゃあ"), ["ゃ", "あ"]);
    }

    #[test]
    fn test_iter_restartable() {
        let normalized = normalize("しょうがっこう");
        let first: Vec<_> = MoraIter::new(&normalized).collect();
        let second: Vec<_> = MoraIter::new(&normalized).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(first[0].is_digraph());
        assert!(!first[1].is_digraph());
    }
}
