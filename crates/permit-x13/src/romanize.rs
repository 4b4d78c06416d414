//! ASCII identifiers for series names.
//!
//! The engine only accepts ASCII in titles and file names. Hangul syllables
//! are romanized one syllable at a time with the Revised Romanization of
//! Korean; no assimilation across syllable boundaries is attempted.

/// Longest identifier the engine accepts as a series name.
pub const MAX_IDENTIFIER_LEN: usize = 64;

const SYLLABLE_BASE: u32 = 0xAC00;
const SYLLABLE_LAST: u32 = 0xD7A3;

const INITIALS: [&str; 19] = [
    "g", "kk", "n", "d", "tt", "r", "m", "b", "pp", "s", "ss", "", "j", "jj", "ch", "k", "t", "p",
    "h",
];

const MEDIALS: [&str; 21] = [
    "a", "ae", "ya", "yae", "eo", "e", "yeo", "ye", "o", "wa", "wae", "oe", "yo", "u", "wo", "we",
    "wi", "yu", "eu", "ui", "i",
];

const FINALS: [&str; 28] = [
    "", "k", "k", "k", "n", "n", "n", "t", "l", "k", "m", "l", "l", "l", "p", "l", "m", "p", "p",
    "t", "t", "ng", "t", "t", "k", "t", "p", "t",
];

/// Romanizes one precomposed Hangul syllable.
pub fn romanize_syllable(ch: char) -> Option<String> {
    let code = u32::from(ch);
    if !(SYLLABLE_BASE..=SYLLABLE_LAST).contains(&code) {
        return None;
    }
    let offset = (code - SYLLABLE_BASE) as usize;
    let initial = INITIALS[offset / (21 * 28)];
    let medial = MEDIALS[(offset % (21 * 28)) / 28];
    let last = FINALS[offset % 28];
    Some(format!("{initial}{medial}{last}"))
}

/// Builds an engine-safe identifier from a series name.
///
/// Hangul is romanized, ASCII letters and digits are kept, and every run of
/// other characters becomes one `_`. The result is capped at
/// [`MAX_IDENTIFIER_LEN`] characters.
pub fn ascii_identifier(name: &str) -> String {
    let mut identifier = String::with_capacity(name.len());
    for ch in name.chars() {
        if let Some(roman) = romanize_syllable(ch) {
            identifier.push_str(&roman);
        } else if ch.is_ascii_alphanumeric() {
            identifier.push(ch);
        } else if !identifier.ends_with('_') {
            identifier.push('_');
        }
    }
    identifier.truncate(MAX_IDENTIFIER_LEN);
    if identifier.is_empty() {
        identifier.push_str("series");
    }
    identifier
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn romanizes_syllables() {
        assert_eq!(romanize_syllable('동').as_deref(), Some("dong"));
        assert_eq!(romanize_syllable('연').as_deref(), Some("yeon"));
        assert_eq!(romanize_syllable('적').as_deref(), Some("jeok"));
        assert_eq!(romanize_syllable('a'), None);
    }

    #[test]
    fn builds_identifiers() {
        assert_eq!(ascii_identifier("use6_동수_주거용"), "use6_dongsu_jugeoyong");
        assert_eq!(ascii_identifier("use6_연면적_교육및사회용"), "use6_yeonmyeonjeok_gyoyukmitsahoeyong");
        assert_eq!(ascii_identifier("a · b"), "a_b");
        assert_eq!(ascii_identifier("···"), "_");
        assert_eq!(ascii_identifier(""), "series");
    }

    #[test]
    fn caps_length() {
        let long = "가".repeat(100);
        let identifier = ascii_identifier(&long);
        assert_eq!(identifier.len(), MAX_IDENTIFIER_LEN);
        assert!(identifier.is_ascii());
    }
}
