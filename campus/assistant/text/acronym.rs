use once_cell::sync::Lazy;
use regex::Regex;

use super::normalizer::normalize;

/// Words skipped when collecting initials.
pub const STOP_WORDS: [&str; 10] = ["de", "des", "d'", "et", "la", "le", "les", "à", "aux", "en"];

const ELIDED_PREFIXES: [&str; 4] = ["d'", "l'", "d’", "l’"];

static PARENTHETICAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthetical pattern is valid"));

/// Removes every `( … )` segment, brackets included.
#[must_use]
pub fn strip_parentheticals(name: &str) -> String {
    PARENTHETICAL.replace_all(name, " ").into_owned()
}

/// Initials of the significant words of `name`, normalized.
///
/// `"École Hassania des Travaux Publics (EHTP)"` gives `"ehtp"`: the bracketed
/// segment is dropped first and `des` is a stop word.
#[must_use]
pub fn derive_acronym(name: &str) -> String {
    let stripped = strip_parentheticals(name);
    let initials: String = stripped
        .split_whitespace()
        .filter(|word| !is_stop_word(word))
        .filter_map(|word| {
            let lowered = word.to_lowercase();
            let core = strip_elision(&lowered);
            core.chars().find(|c| c.is_alphanumeric())
        })
        .collect();
    normalize(&initials.to_uppercase())
}

fn is_stop_word(word: &str) -> bool {
    let folded = normalize(word);
    STOP_WORDS.iter().any(|stop| normalize(stop) == folded)
}

/// Drops a leading `l'`/`d'` from a lowercased word, keeping the word itself
/// when nothing follows the apostrophe.
pub(crate) fn strip_elision(word: &str) -> &str {
    ELIDED_PREFIXES
        .iter()
        .find_map(|prefix| word.strip_prefix(prefix).filter(|rest| !rest.is_empty()))
        .unwrap_or(word)
}
