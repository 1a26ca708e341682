use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Tokens shorter than this many characters are discarded.
pub const MIN_TOKEN_CHARS: usize = 2;

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+").expect("valid regex");
}

/// Tokenize a title: NFKC normalization, lowercase, maximal runs of letters and
/// digits, dropping tokens shorter than [`MIN_TOKEN_CHARS`]. No stemming and no
/// stopword removal, so "The" in a title is a term like any other.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized = text.nfkc().collect::<String>().to_lowercase();
    RE.find_iter(&normalized)
        .map(|m| m.as_str())
        .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_string)
        .collect()
}
