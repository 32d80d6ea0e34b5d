/// Replaces unescaped `~` with the trimmed first headword of the entry.
///
/// `^~` inserts the headword with the case of its first letter inverted.
/// Escapes such as `\~` are copied through untouched.
pub fn expand_tildes(text: &str, first_headword: &str) -> String {
    let value = first_headword.trim_matches(crate::source::is_dsl_blank);
    let mut out = String::with_capacity(text.len() + value.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '^' if chars.peek() == Some(&'~') => {
                chars.next();
                push_case_inverted(&mut out, value);
            }
            '~' => out.push_str(value),
            _ => out.push(c),
        }
    }
    out
}

fn push_case_inverted(out: &mut String, value: &str) {
    let mut chars = value.chars();
    if let Some(first) = chars.next() {
        if first.is_uppercase() {
            out.extend(first.to_lowercase());
        } else {
            out.extend(first.to_uppercase());
        }
    }
    out.push_str(chars.as_str());
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("see ~ bar", "see Foo bar")]
    #[case(r"a \~ b", r"a \~ b")]
    #[case("~s and ~", "Foos and Foo")]
    #[case("^~ly", "fooly")]
    #[case(r"\^~", r"\^Foo")]
    #[case("no tilde", "no tilde")]
    fn tildes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(expand_tildes(input, "Foo"), expected);
    }

    #[test]
    fn headword_is_trimmed_and_lowercase_inverts_to_upper() {
        assert_eq!(expand_tildes("~/^~", "  cat\t"), "cat/Cat");
    }
}
