//! Token-sort similarity scoring.
//!
//! Both strings are lowercased, split on every non-alphanumeric character,
//! the tokens sorted and rejoined with single spaces. The score is the
//! normalized Indel similarity of the two results as a percentage.

use rapidfuzz::distance::indel;

/// Sorted-token form of a string: `"T_eff K"` becomes `"eff k t"`.
pub fn token_sort_key(text: &str) -> String {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

/// Similarity in `0.0..=1.0`; zero when either side has no tokens.
pub fn token_sort_similarity(a: &str, b: &str) -> f64 {
    let a = token_sort_key(a);
    let b = token_sort_key(b);
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    indel::normalized_similarity(a.chars(), b.chars())
}

/// Similarity rounded to a whole percentage.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    percent(token_sort_similarity(a, b))
}

pub(crate) fn percent(similarity: f64) -> u8 {
    (similarity * 100.0).round().clamp(0.0, 100.0) as u8
}
