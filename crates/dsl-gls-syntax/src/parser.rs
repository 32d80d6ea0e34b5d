//! # Parser - Building the Article Tree
//!
//! The parser walks the token stream once and maintains a stack of open
//! elements. It never fails: every malformation degrades to text or to an
//! implicitly closed element, with a warning naming the article.
//!
//! ## Rules
//!
//! - Blanks at the start of a line are indentation, not content.
//! - `[name attrs]` opens an element, `[/name]` closes the nearest open
//!   element with that name. `[/m]` also closes `[m0]`..`[m9]`.
//! - Closing an element that is not on top of the stack closes the
//!   elements above it too, and reopens them afterwards so their formatting
//!   continues past the out-of-order close.
//! - `[br]` is a void element.
//! - `<<text>>` is shorthand for `[ref]text[/ref]`.
//! - A line whose first non-blank character (after any tags) is an unescaped
//!   `@` is an embedded article header that was not consumed by the indexer;
//!   it becomes an `@` element holding the rest of the line.
//! - A line break straight after a closing indentation tag (`[/m]`) is
//!   dropped, the `div` already breaks the line.
//! - Trailing line breaks at the end of the article are dropped.

use crate::lexer::{Token, TokenKind, lex};
use crate::tree::{Element, Node};

/// Parse article text into a tree rooted at an unnamed [`Element`].
///
/// `headword` is only used to give warnings some context.
pub fn parse(text: &str, headword: &str) -> Element {
    let tokens = lex(text);
    let mut builder = TreeBuilder::new(headword);
    let mut pos = 0;

    while pos < tokens.len() {
        let token = &tokens[pos];
        pos += 1;

        match token.kind {
            TokenKind::Whitespace => {
                if !builder.at_line_start {
                    builder.text(token.text);
                }
                continue;
            }
            TokenKind::Newline => {
                builder.newline();
                continue;
            }
            TokenKind::At if builder.line_prefix => {
                pos = builder.insided_header(&tokens, pos);
            }
            TokenKind::At => builder.text(token.text),
            TokenKind::Escape => builder.text(&token.text[1..]),
            TokenKind::OpenTag => {
                let (name, attrs) = token.tag_parts();
                builder.open(name, attrs, token.text);
                builder.at_line_start = false;
                builder.after_block_close = false;
                continue;
            }
            TokenKind::CloseTag => {
                let (name, _) = token.tag_parts();
                builder.close(name);
                builder.at_line_start = false;
                builder.line_prefix = false;
                continue;
            }
            TokenKind::RefOpen => builder.open("ref", "", token.text),
            TokenKind::RefClose => {
                if builder.is_open("ref") {
                    builder.close("ref");
                } else {
                    builder.text(token.text);
                }
            }
            TokenKind::LBracket
            | TokenKind::RBracket
            | TokenKind::Lt
            | TokenKind::Gt
            | TokenKind::Text => builder.text(token.text),
        }

        builder.at_line_start = false;
        builder.line_prefix = false;
        builder.after_block_close = false;
    }

    builder.finish()
}

struct TreeBuilder<'h> {
    /// Open elements; `stack[0]` is the root and is never popped before `finish`.
    stack: Vec<Element>,
    /// Only blanks seen on the current line so far.
    at_line_start: bool,
    /// Only blanks and opening tags seen on the current line so far.
    line_prefix: bool,
    /// The last thing emitted closed an indentation element.
    after_block_close: bool,
    headword: &'h str,
}

impl<'h> TreeBuilder<'h> {
    fn new(headword: &'h str) -> Self {
        Self {
            stack: vec![Element::root()],
            at_line_start: true,
            line_prefix: true,
            after_block_close: false,
            headword,
        }
    }

    fn top(&mut self) -> &mut Element {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn text(&mut self, text: &str) {
        self.top().push_text(text);
    }

    fn newline(&mut self) {
        if !self.after_block_close {
            self.text("\n");
        }
        self.at_line_start = true;
        self.line_prefix = true;
        self.after_block_close = false;
    }

    fn open(&mut self, name: &str, attrs: &str, raw: &str) {
        if name.is_empty() {
            self.text(raw);
            return;
        }
        if name == "br" {
            self.top().push_element(Element::new(name, attrs));
            return;
        }
        self.stack.push(Element::new(name, attrs));
    }

    fn is_open(&self, name: &str) -> bool {
        self.stack.iter().skip(1).any(|e| e.name == name)
    }

    fn close(&mut self, name: &str) {
        if name == "br" {
            return;
        }
        let found = self
            .stack
            .iter()
            .rposition(|open| !open.is_root() && closes(name, &open.name));
        let Some(index) = found else {
            log::warn!(
                "unmatched closing tag [/{name}] in article \"{}\"",
                self.headword
            );
            return;
        };

        let mut reopened = Vec::new();
        while self.stack.len() > index + 1 {
            if let Some(inner) = self.stack.pop() {
                reopened.push(Element::new(inner.name.clone(), inner.attrs.clone()));
                self.attach(inner);
            }
        }
        if let Some(closed) = self.stack.pop() {
            self.after_block_close = is_indentation(&closed.name);
            self.attach(closed);
        }
        self.stack.extend(reopened.into_iter().rev());
    }

    fn attach(&mut self, element: Element) {
        if let Some(parent) = self.stack.last_mut() {
            parent.push_element(element);
        }
    }

    /// Consumes the rest of an `@` line and records it as an `@` element.
    /// Returns the position of the terminating newline (or the end).
    fn insided_header(&mut self, tokens: &[Token<'_>], mut pos: usize) -> usize {
        let mut header = String::new();
        while let Some(token) = tokens.get(pos) {
            match token.kind {
                TokenKind::Newline => break,
                TokenKind::Escape => header.push_str(&token.text[1..]),
                _ => header.push_str(token.text),
            }
            pos += 1;
        }

        let header = header.trim();
        if !header.is_empty() {
            let mut element = Element::new("@", "");
            element.push_text(header);
            self.top().push_element(element);
        }
        pos
    }

    fn finish(mut self) -> Element {
        while self.stack.len() > 1 {
            if let Some(open) = self.stack.pop() {
                log::warn!(
                    "unclosed tag [{}] in article \"{}\"",
                    open.name,
                    self.headword
                );
                self.attach(open);
            }
        }

        let mut root = self.stack.pop().unwrap_or_default();
        trim_trailing_breaks(&mut root);
        root
    }
}

fn closes(closing: &str, open: &str) -> bool {
    closing == open || (closing == "m" && is_indentation(open))
}

fn is_indentation(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next() == Some('m')
        && match (chars.next(), chars.next()) {
            (None, _) => true,
            (Some(digit), None) => digit.is_ascii_digit(),
            _ => false,
        }
}

fn trim_trailing_breaks(root: &mut Element) {
    if let Some(Node::Text(last)) = root.children.last_mut() {
        let trimmed_len = last.trim_end_matches(['\r', '\n', ' ', '\t']).len();
        last.truncate(trimmed_len);
        if last.is_empty() {
            root.children.pop();
        }
    }
}
