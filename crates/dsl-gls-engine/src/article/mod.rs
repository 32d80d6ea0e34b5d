//! Re-reading one card and splitting it into display headword and body.
//!
//! A card's range starts with its headword lines. For an embedded card the
//! range starts at its indented `@` line instead, and every following `@`
//! line without content in between is another headword of it. The headword
//! shown is the one whose expansion folds to the requested key.

use crate::error::{DslError, Result};
use crate::headword::{
    UnsortedParts, expand_tildes, finish_headword, find_unescaped, fold, is_at_sign_first,
    optional_variants, process_unsorted_parts,
};
use crate::index::Card;
use crate::source::{ByteRangeReader, DslEncoding, is_dsl_blank, strip_comments};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedArticle {
    /// Headword to show, unsorted parts visible and tildes expanded.
    pub display_headword: String,
    /// Replacement for `~` in the body.
    pub tilde_value: String,
    /// Headword lines that did not match before the one that did.
    pub headword_index: usize,
    pub body: String,
}

/// Outcome of looking at one headword line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadwordMatch {
    /// The line matches; carries its index among the headword lines.
    Found(usize),
    /// A headword line that does not match.
    NotFound,
    /// Not a usable headword line (empty, or an embedded header with an
    /// unescaped `~`).
    Malformed,
}

/// Reads `card` from `reader` and resolves it for `requested_folded`.
pub fn resolve_article(
    reader: &dyn ByteRangeReader,
    encoding: DslEncoding,
    card: &Card,
    requested_folded: &str,
) -> Result<ResolvedArticle> {
    let bytes = reader.read_range(card.offset, card.size)?;
    let text = encoding.decode(&bytes).ok_or_else(|| DslError::InvalidArticle {
        offset: card.offset,
        reason: format!("cannot decode as {}", encoding.name()),
    })?;
    let text = strip_comments(&text, &mut false);
    if text.is_empty() {
        return Err(DslError::InvalidArticle {
            offset: card.offset,
            reason: "empty article".to_string(),
        });
    }
    Ok(resolve_text(&text, requested_folded))
}

/// Resolves already decoded, comment-free article text.
pub fn resolve_text(text: &str, requested_folded: &str) -> ResolvedArticle {
    let insided = text.starts_with(is_dsl_blank);
    let mut scan = HeadwordScan::new(fold(requested_folded), insided);
    let mut pos = 0;

    loop {
        let end = text[pos..]
            .find(['\n', '\r'])
            .map_or(text.len(), |n| pos + n);

        if scan.display.is_none() {
            match scan.step(&text[pos..end]) {
                HeadwordMatch::Found(index) => {
                    log::trace!("requested headword is headword line {index}");
                }
                HeadwordMatch::NotFound => {}
                HeadwordMatch::Malformed => {
                    log::trace!("skipping non-headword line {:?}", &text[pos..end]);
                }
            }
        }

        pos = skip_line_break(text, end);
        if pos == text.len() {
            break;
        }

        let rest = &text[pos..];
        if rest.starts_with(is_dsl_blank) {
            if !insided {
                break;
            }
            let next_line = &rest[..rest.find(['\n', '\r']).unwrap_or(rest.len())];
            if !is_embedded_marker(next_line) {
                break;
            }
        }
    }

    let display_headword = match scan.display {
        Some(display) => display,
        None if insided => requested_folded.to_string(),
        None => scan.tilde_value.clone(),
    };

    ResolvedArticle {
        display_headword,
        tilde_value: scan.tilde_value,
        headword_index: scan.index,
        body: text[pos..].to_string(),
    }
}

fn skip_line_break(text: &str, mut pos: usize) -> usize {
    if text[pos..].starts_with('\r') {
        pos += 1;
    }
    if text[pos..].starts_with('\n') {
        pos += 1;
    }
    pos
}

/// An indented line whose first visible character is an unescaped `@`.
fn is_embedded_marker(line: &str) -> bool {
    match line.find('@') {
        Some(at) => !line[..at].ends_with('\\') && is_at_sign_first(line),
        None => false,
    }
}

/// Walks the headword lines of one article.
struct HeadwordScan {
    requested: String,
    insided: bool,
    /// First headword with braces of unsorted parts kept; expands `~` in
    /// later headword lines.
    tilde_source: Option<String>,
    tilde_value: String,
    index: usize,
    display: Option<String>,
}

impl HeadwordScan {
    fn new(requested: String, insided: bool) -> Self {
        Self {
            requested,
            insided,
            tilde_source: None,
            tilde_value: String::new(),
            index: 0,
            display: None,
        }
    }

    fn step(&mut self, line: &str) -> HeadwordMatch {
        let raw = if self.insided && line.starts_with(is_dsl_blank) {
            match line.find('@') {
                Some(at) => {
                    let header = line[at + 1..].trim_matches(is_dsl_blank);
                    if find_unescaped(header, '~').is_some() {
                        return HeadwordMatch::Malformed;
                    }
                    header
                }
                None => line,
            }
        } else {
            line
        };
        if raw.is_empty() {
            return HeadwordMatch::Malformed;
        }

        let tilde_source = match &self.tilde_source {
            Some(source) => source.clone(),
            None => {
                let first = optional_variants(raw)
                    .into_iter()
                    .next()
                    .unwrap_or_else(|| raw.to_string());
                self.tilde_value = process_unsorted_parts(&first, UnsortedParts::Keep);
                first
            }
        };
        let had_first = self.tilde_source.is_some();
        let expand = |text: &str| {
            if had_first {
                expand_tildes(text, &tilde_source)
            } else {
                text.to_string()
            }
        };

        let key_line = process_unsorted_parts(&expand(raw), UnsortedParts::Strip);
        let matches = optional_variants(&key_line)
            .iter()
            .any(|variant| fold(&finish_headword(variant)) == self.requested);

        if matches {
            self.display = Some(process_unsorted_parts(&expand(raw), UnsortedParts::Keep));
            return HeadwordMatch::Found(self.index);
        }

        self.index += 1;
        self.tilde_source = Some(tilde_source);
        HeadwordMatch::NotFound
    }
}
