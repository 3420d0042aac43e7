use std::collections::BTreeSet;

/// Order- and duplicate-insensitive similarity between two whitespace-tokenized
/// strings, 0-100.
///
/// Shared tokens with nothing left over on one side score 100. Otherwise the
/// sorted intersection and the two "intersection + remainder" strings are
/// compared pairwise by indel similarity (`2 * LCS / (len_a + len_b)`) and the
/// best pair wins.
#[must_use]
pub fn token_set_ratio(left: &str, right: &str) -> f64 {
    let left_tokens: BTreeSet<&str> = left.split_whitespace().collect();
    let right_tokens: BTreeSet<&str> = right.split_whitespace().collect();
    if left_tokens.is_empty() || right_tokens.is_empty() {
        return 0.0;
    }

    let sect = join(left_tokens.intersection(&right_tokens).copied());
    let left_only = join(left_tokens.difference(&right_tokens).copied());
    let right_only = join(right_tokens.difference(&left_tokens).copied());
    if !sect.is_empty() && (left_only.is_empty() || right_only.is_empty()) {
        return 100.0;
    }

    let combined_left = concat(&sect, &left_only);
    let combined_right = concat(&sect, &right_only);
    ratio(&sect, &combined_left)
        .max(ratio(&sect, &combined_right))
        .max(ratio(&combined_left, &combined_right))
}

/// First candidate with the highest [`token_set_ratio`] against `query`,
/// provided that score reaches `threshold`.
#[must_use]
pub fn best_match<'a, I>(query: &str, candidates: I, threshold: u8) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let score = token_set_ratio(query, candidate);
        match best {
            Some((_, top)) if score <= top => {}
            _ => best = Some((candidate, score)),
        }
    }
    best.filter(|(_, score)| *score >= f64::from(threshold))
        .map(|(candidate, _)| candidate)
}

fn ratio(left: &str, right: &str) -> f64 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    rapidfuzz::fuzz::ratio(left.chars(), right.chars()) * 100.0
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(" ")
}

fn concat(head: &str, tail: &str) -> String {
    match (head.is_empty(), tail.is_empty()) {
        (true, _) => tail.to_string(),
        (_, true) => head.to_string(),
        _ => format!("{head} {tail}"),
    }
}
