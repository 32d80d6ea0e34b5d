/// Upper bound on the variants produced from a single string.
pub const MAX_VARIANTS: usize = 32;

/// Strings longer than this (in characters) are not expanded.
pub const MAX_EXPANDABLE_CHARS: usize = 100;

/// Expands `(...)` optional parts into every combination, appending the
/// variants to `out` and skipping ones already present.
///
/// Spans are resolved left to right, the variant without the span first.
/// Nested spans are expanded inside the kept variant. An unclosed `(` that
/// is not the last character also yields the text before it as a variant.
pub fn expand_optional_parts(text: &str, out: &mut Vec<String>) {
    let chars: Vec<char> = text.chars().collect();
    let mut variants = Vec::new();

    if chars.len() > MAX_EXPANDABLE_CHARS {
        variants.push(text.to_string());
    } else {
        expand_from(chars, 0, &mut variants);
    }

    for variant in variants {
        if !out.contains(&variant) {
            out.push(variant);
        }
    }
}

/// Convenience wrapper returning a fresh variant list.
pub fn optional_variants(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    expand_optional_parts(text, &mut out);
    out
}

fn expand_from(chars: Vec<char>, start: usize, out: &mut Vec<String>) {
    if out.len() >= MAX_VARIANTS {
        return;
    }

    let mut x = start;
    while x < chars.len() {
        match chars[x] {
            '\\' => x += 2,
            '(' => {
                match matching_paren(&chars, x) {
                    Some(close) => {
                        let omitted = [&chars[..x], &chars[close + 1..]].concat();
                        expand_from(omitted, x, out);
                        let kept = [&chars[..x], &chars[x + 1..close], &chars[close + 1..]].concat();
                        expand_from(kept, x, out);
                    }
                    None => {
                        if x + 1 != chars.len() {
                            expand_from(chars[..x].to_vec(), x, out);
                        }
                        let kept = [&chars[..x], &chars[x + 1..]].concat();
                        expand_from(kept, x, out);
                    }
                }
                return;
            }
            _ => x += 1,
        }
    }

    if out.len() < MAX_VARIANTS {
        out.push(chars.into_iter().collect());
    }
}

fn matching_paren(chars: &[char], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut y = open;
    while y < chars.len() {
        match chars[y] {
            '\\' => y += 1,
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(y);
                }
            }
            _ => {}
        }
        y += 1;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("abc", &["abc"])]
    #[case("a(b)c", &["ac", "abc"])]
    #[case("a(b)c(d)", &["ac", "acd", "abc", "abcd"])]
    #[case("a(b(c))", &["a", "ab", "abc"])]
    #[case(r"a\(b\)", &[r"a\(b\)"])]
    #[case("a(bc", &["a", "abc"])]
    #[case("abc(", &["abc"])]
    #[case("()", &[""])]
    fn expansion(#[case] input: &str, #[case] expected: &[&str]) {
        assert_eq!(optional_variants(input), expected);
    }

    #[test]
    fn appends_without_duplicates() {
        let mut out = vec!["ac".to_string()];
        expand_optional_parts("a(b)c", &mut out);
        expand_optional_parts("abc", &mut out);
        assert_eq!(out, vec!["ac", "abc"]);
    }

    #[test]
    fn variant_count_is_capped() {
        let input = "(a)(b)(c)(d)(e)(f)x";
        assert_eq!(optional_variants(input).len(), MAX_VARIANTS);
    }

    #[test]
    fn long_strings_are_not_expanded() {
        let input = format!("{}(x)", "a".repeat(MAX_EXPANDABLE_CHARS));
        assert_eq!(optional_variants(&input), vec![input.clone()]);
    }
}
