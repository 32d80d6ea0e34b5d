//! # Lexer - Tokenizing DSL Article Text
//!
//! This module provides the first stage of parsing: breaking article text into
//! tokens using the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## The Lossless Guarantee
//!
//! Every byte in the input appears in exactly one token. Nothing is skipped,
//! so the tree builder can always fall back to emitting the raw text of a
//! token it does not understand:
//!
//! ```
//! use dsl_gls_syntax::lexer::lex;
//!
//! let input = "[b]bold[/b] \\[not a tag\\]\n";
//! let tokens = lex(input);
//!
//! let reconstructed: String = tokens.iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! ## Token Design
//!
//! Tags are recognised whole (`[c red]`, `[/c]`) because DSL tags never span
//! lines and never nest brackets. A lone `[` or `]` that does not form a tag
//! gets its own token and is treated as text by the tree builder.
//!
//! Escapes (`\[`, `\~`, `\@`, ...) are a single token covering the backslash
//! and the escaped character.

use logos::Logos;

/// Token kinds produced by the Logos lexer.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    /// Backslash followed by the character it escapes
    #[regex(r"\\[^\r\n]")]
    Escape,

    /// Opening tag with optional attributes: `[b]`, `[c red]`, `[lang id=1033]`
    #[regex(r"\[[^/\[\]\r\n][^\[\]\r\n]*\]")]
    OpenTag,

    /// Closing tag: `[/b]`
    #[regex(r"\[/[^\[\]\r\n]*\]")]
    CloseTag,

    /// `<<` starting a reference
    #[token("<<")]
    RefOpen,

    /// `>>` ending a reference
    #[token(">>")]
    RefClose,

    /// `@` introducing an embedded article header
    #[token("@")]
    At,

    /// Lone `[` that does not start a tag
    #[token("[")]
    LBracket,

    /// Lone `]`
    #[token("]")]
    RBracket,

    /// Single `<`
    #[token("<")]
    Lt,

    /// Single `>`
    #[token(">")]
    Gt,

    /// Plain text - anything not matched by other rules
    #[regex(r"[^\\\[\]<>@\r\n \t]+")]
    Text,
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
}

impl Token<'_> {
    /// Name and attribute string of an `OpenTag`/`CloseTag` token.
    ///
    /// The name runs up to the first blank; everything after it, trimmed, is
    /// the attribute string. Closing tags have the leading `/` removed.
    pub fn tag_parts(&self) -> (&str, &str) {
        let inner = &self.text[1..self.text.len() - 1];
        let inner = inner.strip_prefix('/').unwrap_or(inner).trim();
        match inner.find([' ', '\t']) {
            Some(n) => (&inner[..n], inner[n..].trim()),
            None => (inner, ""),
        }
    }
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
/// Characters Logos cannot match (a bare `\r`, a trailing backslash) come out
/// as `Text`.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = result.unwrap_or(TokenKind::Text);
        tokens.push(Token { kind, text });
    }

    tokens
}
