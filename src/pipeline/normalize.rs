//! Accent- and case-insensitive text comparison.
//!
//! Report text mixes accented and unaccented spellings of the same word
//! (`pérdida` / `perdida`, `Diagnóstico` / `DIAGNOSTICO`), so every phrase
//! comparison goes through [`normalize`] on both sides.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Lower-case `text` and strip diacritics.
///
/// Uses compatibility decomposition, so ordinal indicators and ligatures fold
/// too (`º` → `o`, `ﬁ` → `fi`).
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect()
}

/// True iff the normalised `phrase` occurs in the normalised `haystack`.
///
/// An empty haystack never contains a non-empty phrase.
pub fn contains_phrase(haystack: &str, phrase: &str) -> bool {
    normalize(haystack).contains(&normalize(phrase))
}

/// True iff the normalised `text` starts with any of the (already normalised) `prefixes`.
pub fn starts_with_any(text: &str, prefixes: &[&str]) -> bool {
    let text = normalize(text);
    prefixes.iter().any(|p| text.starts_with(p))
}

/// Remove invisible code points and a trailing carriage return from one
/// line of extracted text.
pub fn clean_line(line: &str) -> String {
    line.trim_end_matches('\r').replace(
        [
            '\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{200C}', '\u{200D}', '\u{2060}',
        ],
        "",
    )
}
