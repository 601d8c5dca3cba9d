use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// Shorter tokens never reach the index and never match at query time.
pub const MIN_WORD_LEN: usize = 3;

/// Split a page body into raw whitespace-delimited tokens, with markup tags
/// treated as separators. Tokens are untouched otherwise: punctuation and
/// digits survive here and are rejected by [`normalize`].
pub fn raw_words(html: &str) -> Vec<String> {
    let text = TAG.replace_all(html, " ");
    text.split_whitespace().map(str::to_owned).collect()
}

/// Indexing-time word rule: a token is indexable iff every character is
/// ASCII-alphabetic and it is at least [`MIN_WORD_LEN`] long. Indexable
/// tokens are lowercased; everything else is discarded.
pub fn normalize(token: &str) -> Option<String> {
    if token.len() < MIN_WORD_LEN {
        return None;
    }
    if !token.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(token.to_ascii_lowercase())
}

/// Full indexing pipeline: raw tokens filtered through the word rule.
pub fn words(html: &str) -> Vec<String> {
    raw_words(html)
        .iter()
        .filter_map(|t| normalize(t))
        .collect()
}
