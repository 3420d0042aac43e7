use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"));

/// Folds text into the comparable form used for every match: NFKD with all
/// non-ASCII code points dropped, lowercased, punctuation removed.
///
/// Whitespace is preserved as-is so substring checks keep word spacing.
#[must_use]
pub fn normalize(text: &str) -> String {
    let ascii: String = text.nfkd().filter(char::is_ascii).collect();
    let lowered = ascii.to_lowercase();
    PUNCTUATION.replace_all(&lowered, "").into_owned()
}
