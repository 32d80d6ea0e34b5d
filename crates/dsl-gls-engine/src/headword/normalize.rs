use std::sync::OnceLock;

use regex::Regex;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::source::is_dsl_blank;

/// Turns every `\X` into `X`.
pub fn unescape_dsl(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Collapses runs of blanks into one space and trims the ends.
pub fn normalize_headword(text: &str) -> String {
    text.split(is_dsl_blank)
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lookup key of a headword: case and diacritics are folded away.
///
/// Idempotent, so keys can be folded again at query time without harm.
pub fn fold(text: &str) -> String {
    let lowered: String = text
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect();
    lowered
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Whether the first visible character of `line` is `@`, allowing leading
/// blanks and formatting tags such as `[m1]` before it.
pub fn is_at_sign_first(line: &str) -> bool {
    static AT_SIGN_FIRST: OnceLock<Regex> = OnceLock::new();
    AT_SIGN_FIRST
        .get_or_init(|| {
            Regex::new(r"^[ \t]*(?:\[[^\]]+\][ \t]*)*@").expect("Invalid at-sign regex")
        })
        .is_match(line)
}

/// Position of the first `target` not preceded by a backslash escape.
pub fn find_unescaped(text: &str, target: char) -> Option<usize> {
    let mut chars = text.char_indices();
    while let Some((i, c)) = chars.next() {
        if c == '\\' {
            chars.next();
        } else if c == target {
            return Some(i);
        }
    }
    None
}
