//! Headword rewrites: unsorted parts, optional parts, tildes, escapes and
//! folding.
//!
//! Indexing applies them in a fixed order to each headword line: unsorted
//! parts are stripped, `~` is replaced by the first headword (on every line
//! after the first), optional parts are expanded, and finally each variant
//! is unescaped and normalized.

mod normalize;
mod optional;
mod tilde;
mod unsorted;

pub use normalize::{find_unescaped, fold, is_at_sign_first, normalize_headword, unescape_dsl};
pub use optional::{MAX_EXPANDABLE_CHARS, MAX_VARIANTS, expand_optional_parts, optional_variants};
pub use tilde::expand_tildes;
pub use unsorted::{UnsortedParts, process_unsorted_parts};

/// Adds the raw variants of one headword line to `variants`.
///
/// The first variant already collected is the tilde value for later lines.
pub fn expand_headword_line(line: &str, variants: &mut Vec<String>) {
    let mut text = process_unsorted_parts(line, UnsortedParts::Strip);
    if let Some(first) = variants.first() {
        text = expand_tildes(&text, first);
    }
    expand_optional_parts(&text, variants);
}

/// Final form of an indexed headword: unescaped and blank-normalized.
pub fn finish_headword(raw: &str) -> String {
    normalize_headword(&unescape_dsl(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn headword_lines_expand_against_the_first_variant() {
        let mut variants = Vec::new();
        expand_headword_line("colo(u)r{ed}", &mut variants);
        expand_headword_line("~ful", &mut variants);
        let finished: Vec<_> = variants.iter().map(|v| finish_headword(v)).collect();
        assert_eq!(finished, vec!["color", "colour", "colorful"]);
    }

    #[test]
    fn finished_headwords_lose_escapes_and_extra_blanks() {
        assert_eq!(finish_headword(r"  A\(B\)   C "), "A(B) C");
    }
}
