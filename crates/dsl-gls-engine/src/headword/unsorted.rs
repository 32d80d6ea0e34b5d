/// What to do with `{...}` unsorted parts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsortedParts {
    /// Remove the braces and everything between them (lookup keys).
    Strip,
    /// Remove the braces only (display).
    Keep,
}

/// Processes `{...}` spans. Nesting is counted and `\` escapes are skipped.
///
/// An unmatched `}` is dropped. An unclosed `{` under
/// [`UnsortedParts::Strip`] extends to the end of the line.
pub fn process_unsorted_parts(text: &str, mode: UnsortedParts) -> String {
    let mut out = String::with_capacity(text.len());
    let mut depth = 0usize;
    let mut span_start = 0;
    let mut chars = text.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '{' => {
                if depth == 0 {
                    span_start = out.len();
                }
                depth += 1;
            }
            '}' if depth == 0 => {
                log::warn!("unmatched '}}' in \"{text}\"");
            }
            '}' => {
                depth -= 1;
                if depth == 0 && mode == UnsortedParts::Strip {
                    out.truncate(span_start);
                }
            }
            _ => out.push(c),
        }
    }

    if depth > 0 && mode == UnsortedParts::Strip {
        log::warn!("unclosed '{{' in \"{text}\"");
        out.truncate(span_start);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("a{b}c", "ac", "abc")]
    #[case("{the }cat", "cat", "the cat")]
    #[case("a{b{c}d}e", "ae", "abcde")]
    #[case(r"a\{b\}c", r"a\{b\}c", r"a\{b\}c")]
    #[case("a}b", "ab", "ab")]
    #[case("ab{cd", "ab", "abcd")]
    #[case("no spans", "no spans", "no spans")]
    fn unsorted_parts(#[case] input: &str, #[case] stripped: &str, #[case] kept: &str) {
        assert_eq!(process_unsorted_parts(input, UnsortedParts::Strip), stripped);
        assert_eq!(process_unsorted_parts(input, UnsortedParts::Keep), kept);
    }
}
