use std::collections::HashMap;

use crate::error::Result;
use crate::headword::{expand_headword_line, expand_tildes, finish_headword, fold};
use crate::source::{LineScanner, is_dsl_blank};

/// Abbreviation expansions used for `[p]` tooltips.
///
/// Keys are folded headwords, values are plain text with markup removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AbbreviationTable {
    entries: HashMap<String, String>,
}

impl AbbreviationTable {
    /// Reads an abbreviation source: one or more headword lines followed by
    /// an indented line holding the expansion.
    pub fn build(scanner: &mut LineScanner) -> Result<Self> {
        let mut table = Self::default();

        'entries: loop {
            let next = scanner.next_line();
            let Some(line) = next.map_err(|e| e.at_line(scanner.lines_read()))? else {
                break;
            };
            if line.is_blank() || line.is_indented() {
                continue;
            }

            let mut keys = Vec::new();
            let mut current = line;
            let value_line = loop {
                expand_headword_line(&current.text, &mut keys);
                let next = loop {
                    match scanner.next_line().map_err(|e| e.at_line(scanner.lines_read()))? {
                        Some(next) if next.text.is_empty() => continue,
                        Some(next) => break next,
                        None => {
                            log::warn!(
                                "premature end of abbreviation file at line {}",
                                scanner.lines_read()
                            );
                            break 'entries;
                        }
                    }
                };
                if next.is_indented() {
                    break next;
                }
                current = next;
            };

            let mut value_text = value_line
                .text
                .trim_start_matches(is_dsl_blank)
                .to_string();
            if let Some(first) = keys.first() {
                value_text = expand_tildes(&value_text, first);
            }
            let value = dsl_gls_syntax::parse(&value_text, "").render_as_text();

            for key in &keys {
                table.insert(&finish_headword(key), value.clone());
            }
        }

        log::info!("loaded {} abbreviations", table.len());
        Ok(table)
    }

    /// Adds an entry; `key` is folded before it is stored.
    pub fn insert(&mut self, key: &str, value: String) {
        self.entries.insert(fold(key), value);
    }

    /// Looks up the expansion of `key`, folding it first.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(&fold(key)).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for AbbreviationTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Self::default();
        for (key, value) in iter {
            table.insert(key.as_ref(), value.into());
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(source: &str) -> AbbreviationTable {
        let mut scanner = LineScanner::new(source.as_bytes().to_vec()).unwrap();
        AbbreviationTable::build(&mut scanner).unwrap()
    }

    #[test]
    fn entries_are_folded_and_stripped_of_markup() {
        let table = build("#NAME \"abbr\"\n\nn\n\t[i]noun[/i]\nadj(.)\n\tadjective\n");

        assert_eq!(table.len(), 3);
        assert_eq!(table.get("n"), Some("noun"));
        assert_eq!(table.get("N"), Some("noun"));
        assert_eq!(table.get("adj"), Some("adjective"));
        assert_eq!(table.get("adj."), Some("adjective"));
    }

    #[test]
    fn several_keys_share_a_value_and_tildes_expand() {
        let table = build("sb\n~.\n\tsome~\n");
        assert_eq!(table.get("sb"), Some("somesb"));
        assert_eq!(table.get("sb."), Some("somesb"));
    }

    #[test]
    fn truncated_entry_is_dropped() {
        let table = build("a\n\talpha\nb\n");
        assert_eq!(table.get("a"), Some("alpha"));
        assert_eq!(table.get("b"), None);
    }

    #[test]
    fn collects_from_pairs() {
        let table: AbbreviationTable = [("Sth", "something")].into_iter().collect();
        assert_eq!(table.get("sth"), Some("something"));
    }
}
