//! Canonical text form used for similarity only; the original text is what
//! gets written out.

use unicode_normalization::char::canonical_combining_class;
use unicode_normalization::UnicodeNormalization;

/// NFD, strip combining marks, lowercase, ASCII punctuation to spaces, then
/// collapse whitespace.
pub fn normalize(text: &str) -> String {
    let folded: String = text
        .nfd()
        .filter(|&c| canonical_combining_class(c) == 0)
        .flat_map(char::to_lowercase)
        .map(|c| if c.is_ascii_punctuation() { ' ' } else { c })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
