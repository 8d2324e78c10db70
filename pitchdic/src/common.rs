//! Common settings in pitchdic.

/// Small kana that merge with the preceding character into a single mora.
pub const COMBINERS: [char; 16] = [
    'ゃ', 'ゅ', 'ょ', 'ぁ', 'ぃ', 'ぅ', 'ぇ', 'ぉ',
    'ャ', 'ュ', 'ョ', 'ァ', 'ィ', 'ゥ', 'ェ', 'ォ',
];

/// The long-vowel mark, kept through normalization.
pub const LONG_VOWEL_MARK: char = 'ー';

/// Field separator of the pitch-accent source file (U+241E).
pub const RECORD_FIELD_SEPARATOR: char = '␞';

/// Separator of the multi-valued kanji and kana fields (U+241F).
pub const LIST_SEPARATOR: char = '␟';

/// Number of fields a pitch-accent source line must carry.
pub const PITCH_RECORD_FIELDS: usize = 5;

/// Inclusive range of code points treated as kanji headwords.
pub const KANJI_RANGE: std::ops::RangeInclusive<char> = '\u{4e00}'..='\u{9fff}';

/// Returns `true` if the character merges into the preceding mora.
#[inline(always)]
pub fn is_combiner(c: char) -> bool {
    COMBINERS.contains(&c)
}

/// Returns `true` if the character is a plain kana letter or the long-vowel mark.
#[inline(always)]
pub fn is_kana(c: char) -> bool {
    matches!(c, 'ぁ'..='ゖ' | 'ァ'..='ヺ') || c == LONG_VOWEL_MARK
}

/// Returns `true` if the character falls in the CJK unified ideograph block.
#[inline(always)]
pub fn is_kanji(c: char) -> bool {
    KANJI_RANGE.contains(&c)
}
