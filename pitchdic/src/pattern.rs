//! Alignment of pitch-pattern notation to mora.
//!
//! Source dictionaries are inconsistent about whether a pattern carries one
//! symbol per kana or one per mora. [`align`] reconciles both and never fails:
//! when lengths disagree it falls back to padding or truncation.
use crate::common::is_combiner;
use crate::mora::Mora;

/// Two-character markers always treated as a digraph continuation.
const DIGRAPH_MARKERS: [[char; 2]; 4] = [['L', 'l'], ['H', 'l'], ['l', 'h'], ['h', 'l']];

/// Binary pitch level.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum PitchLevel {
    /// High pitch.
    High,
    /// Low pitch.
    Low,
}

/// Pitch at one position of an aligned pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct PitchClass {
    /// High or low.
    pub level: PitchLevel,

    /// `true` when written in lowercase, marking a digraph continuation.
    /// This only affects presentation.
    pub minor: bool,
}

impl PitchClass {
    /// A major high position.
    pub const HIGH: Self = Self::new(PitchLevel::High, false);

    /// A major low position.
    pub const LOW: Self = Self::new(PitchLevel::Low, false);

    /// Creates a new instance.
    #[inline(always)]
    pub const fn new(level: PitchLevel, minor: bool) -> Self {
        Self { level, minor }
    }

    /// Classifies a single notation symbol.
    ///
    /// `H`, `h`, `1` and `2` are high; everything else, including `L`, `l`
    /// and `0`, is low.
    #[inline(always)]
    pub fn from_symbol(c: char) -> Self {
        let level = match c {
            'H' | 'h' | '1' | '2' => PitchLevel::High,
            _ => PitchLevel::Low,
        };
        Self::new(level, c.is_lowercase())
    }

    /// Returns `true` for [`PitchLevel::High`].
    #[inline(always)]
    pub fn is_high(&self) -> bool {
        self.level == PitchLevel::High
    }
}

/// Returns the first of comma-joined pattern alternatives.
pub fn first_alternative(pattern: &str) -> &str {
    match pattern.split_once(',') {
        Some((first, _)) => first.trim(),
        None => pattern,
    }
}

/// Splits comma-joined alternatives, dropping empty ones.
pub fn alternatives(pattern: &str) -> impl Iterator<Item = &str> {
    pattern.split(',').map(str::trim).filter(|p| !p.is_empty())
}

/// Aligns a pattern to mora, yielding `mora.len() + 1` pitch classes.
///
/// The trailing class is the pitch following the last mora.
///
/// # Examples
///
/// ```
/// use pitchdic::mora::segment;
/// use pitchdic::pattern::{align, PitchLevel};
///
/// let classes = align("HLL", &segment("はし"));
/// let levels: Vec<_> = classes.iter().map(|c| c.level).collect();
/// assert_eq!(levels, [PitchLevel::High, PitchLevel::Low, PitchLevel::Low]);
/// ```
pub fn align(pattern: &str, mora: &[Mora]) -> Vec<PitchClass> {
    let pattern: Vec<char> = first_alternative(pattern).chars().collect();
    let positions = mora.len() + 1;

    if pattern.len() == positions {
        return pattern.into_iter().map(PitchClass::from_symbol).collect();
    }

    if let Some(groups) = group(&pattern, mora.len()) {
        return groups.into_iter().map(PitchClass::from_symbol).collect();
    }

    let last = pattern.last().copied().unwrap_or('L');
    pattern
        .into_iter()
        .chain(std::iter::repeat(last))
        .take(positions)
        .map(PitchClass::from_symbol)
        .collect()
}

/// Groups pattern characters so that digraph continuations share a mora.
///
/// Returns the leading character of each group, or `None` when the pattern
/// runs out before the mora do.
fn group(pattern: &[char], num_mora: usize) -> Option<Vec<char>> {
    if num_mora == 0 {
        return None;
    }
    let len = pattern.len();
    let mut heads = Vec::with_capacity(num_mora + 1);
    let mut idx = 0;
    for _ in 0..num_mora {
        let head = *pattern.get(idx)?;
        heads.push(head);
        if idx + 1 < len.saturating_sub(1) && is_digraph_pair(head, pattern[idx + 1]) {
            idx += 2;
        } else {
            idx += 1;
        }
    }
    heads.push(*pattern.last()?);
    Some(heads)
}

#[inline(always)]
fn is_digraph_pair(a: char, b: char) -> bool {
    (a.is_alphabetic() && a.is_uppercase() && b.is_lowercase())
        || DIGRAPH_MARKERS.contains(&[a, b])
}

/// Rewrites a numeric pattern into letters (`0` → `L`, `1`/`2` → `H`).
///
/// Other characters are kept as they are.
pub fn to_letters(pattern: &str) -> String {
    pattern
        .chars()
        .map(|c| match c {
            '0' => 'L',
            '1' | '2' => 'H',
            c => c,
        })
        .collect()
}

/// Generates a per-kana pattern from comma-separated accent numbers.
///
/// Each generated pattern has one symbol per kana plus the trailing slot.
/// Small kana repeat the pitch of the mora they belong to in lowercase.
/// Accent numbers that fail to parse produce an empty alternative.
///
/// # Examples
///
/// ```
/// use pitchdic::pattern::from_accent_number;
///
/// assert_eq!(from_accent_number("はし", "2"), "LHL");
/// assert_eq!(from_accent_number("りょこう", "0"), "LlHHH");
/// assert_eq!(from_accent_number("はし", "0,1"), "LHH,HLL");
/// ```
pub fn from_accent_number(reading: &str, numbers: &str) -> String {
    let numbers = numbers.trim_matches(',');
    if numbers.is_empty() {
        return String::new();
    }
    numbers
        .split(',')
        .map(|number| match number.trim().parse::<usize>() {
            Ok(accent) => accent_pattern(reading, accent),
            Err(_) => String::new(),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn accent_pattern(reading: &str, accent: usize) -> String {
    let chars: Vec<char> = reading.chars().collect();
    let n = chars.len();
    let base: Vec<char> = (0..=n)
        .map(|idx| {
            let high = match (idx, accent) {
                (0, _) => accent == 1,
                (_, 0) => true,
                (_, 1) => false,
                (_, a) if a <= n => idx < a,
                _ => true,
            };
            if high { 'H' } else { 'L' }
        })
        .collect();

    let mut out = String::with_capacity(n + 1);
    let mut mora_idx = 0;
    for (i, &c) in chars.iter().enumerate() {
        if i > 0 && is_combiner(c) {
            out.push(base[mora_idx.max(1) - 1].to_ascii_lowercase());
        } else {
            out.push(base[mora_idx]);
            mora_idx += 1;
        }
    }
    out.push(base[n]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::mora::segment;

    fn levels(classes: &[PitchClass]) -> Vec<PitchLevel> {
        classes.iter().map(|c| c.level).collect()
    }

    #[test]
    fn test_align_exact() {
        let classes = align("HLL", &segment("はし"));
        assert_eq!(levels(&classes), [PitchLevel::High, PitchLevel::Low, PitchLevel::Low]);
    }

    #[test]
    fn test_align_pads_short_pattern() {
        let classes = align("1", &segment("あ"));
        assert_eq!(classes, [PitchClass::HIGH, PitchClass::HIGH]);
    }

    #[test]
    fn test_align_digraph_grouping() {
        // りょ carries two symbols in the per-kana notation.
        let mora = segment("りょこう");
        assert_eq!(mora.len(), 3);
        let classes = align("LlHHH", &mora);
        assert_eq!(
            levels(&classes),
            [PitchLevel::Low, PitchLevel::High, PitchLevel::High, PitchLevel::High]
        );
        assert!(!classes[0].minor);
    }

    #[test]
    fn test_align_lowercase_marks_minor() {
        let classes = align("hL", &segment("あ"));
        assert_eq!(classes[0], PitchClass::new(PitchLevel::High, true));
        assert_eq!(classes[1], PitchClass::LOW);
    }

    #[test]
    fn test_align_first_alternative() {
        let classes = align("LHH, HLL", &segment("はし"));
        assert_eq!(levels(&classes), [PitchLevel::Low, PitchLevel::High, PitchLevel::High]);
    }

    #[test]
    fn test_align_trailing_slot_is_last_symbol() {
        // Grouping keeps the final character for the trailing slot even when
        // the pattern is longer than needed.
        let classes = align("HLHL", &segment("はし"));
        assert_eq!(levels(&classes), [PitchLevel::High, PitchLevel::Low, PitchLevel::Low]);
    }

    #[test]
    fn test_align_falls_back_when_pattern_runs_out() {
        let classes = align("LH", &segment("さくら"));
        assert_eq!(
            levels(&classes),
            [PitchLevel::Low, PitchLevel::High, PitchLevel::High, PitchLevel::High]
        );
    }

    #[test]
    fn test_align_empty_inputs() {
        assert_eq!(align("", &segment("はし")), [PitchClass::LOW; 3]);
        assert_eq!(align("", &[]), [PitchClass::LOW]);
        assert_eq!(levels(&align("HL", &[])), [PitchLevel::High]);
    }

    #[test]
    fn test_align_unknown_symbol_is_low() {
        let classes = align("?x*", &segment("はし"));
        assert_eq!(levels(&classes), [PitchLevel::Low; 3]);
    }

    #[test]
    fn test_align_length_invariant() {
        let patterns = ["", "H", "LH", "LHLHLHLH", "LlHh", "0,1", "12", "Ll"];
        for word in ["", "あ", "しゅんかん", "きょうりょく", "アイスコーヒー"] {
            let mora = segment(word);
            for p in patterns {
                assert_eq!(align(p, &mora).len(), mora.len() + 1, "{word} {p}");
            }
        }
    }

    #[test]
    fn test_to_letters() {
        assert_eq!(to_letters("0112"), "LHHH");
        assert_eq!(to_letters("LHl"), "LHl");
    }

    #[test]
    fn test_alternatives() {
        let alts: Vec<_> = alternatives("LHH, HLL,,").collect();
        assert_eq!(alts, ["LHH", "HLL"]);
        assert_eq!(first_alternative("LHH, HLL"), "LHH");
        assert_eq!(first_alternative("LHH"), "LHH");
    }

    #[test]
    fn test_from_accent_number() {
        assert_eq!(from_accent_number("はし", "1"), "HLL");
        assert_eq!(from_accent_number("はし", "2"), "LHL");
        assert_eq!(from_accent_number("はし", "0"), "LHH");
        assert_eq!(from_accent_number("きょう", "1"), "HhLL");
        assert_eq!(from_accent_number("はし", "2,"), "LHL");
        assert_eq!(from_accent_number("はし", "x"), "");
        assert_eq!(from_accent_number("はし", ""), "");
    }

    #[test]
    fn test_generated_pattern_aligns() {
        let reading = "きょうりょく";
        let pattern = from_accent_number(reading, "0");
        let mora = segment(reading);
        let classes = align(&pattern, &mora);
        assert_eq!(classes.len(), mora.len() + 1);
        assert_eq!(classes[0].level, PitchLevel::Low);
        assert!(classes[1..].iter().all(PitchClass::is_high));
    }
}
