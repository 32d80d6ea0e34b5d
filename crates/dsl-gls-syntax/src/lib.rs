//! # dsl-gls-syntax
//!
//! Parser for the inline markup of Lingvo DSL articles, producing a small
//! owned tree that renderers walk.
//!
//! ## Architecture Overview
//!
//! ```text
//! Article text → Lexer → Tokens → TreeBuilder → Element tree
//!                (Logos)          (stack of open tags)
//! ```
//!
//! ### 1. Lexer ([`lexer`] module)
//!
//! [Logos] turns the text into a flat, lossless token stream. Tags such as
//! `[c red]` and `[/c]` are single tokens, escapes such as `\[` are single
//! tokens, and everything else is text, blanks or line breaks.
//!
//! ### 2. Parser ([`parser`] module)
//!
//! A single pass over the tokens keeps a stack of open elements. DSL sources
//! in the wild are messy, so the parser never fails: unmatched closing tags
//! are dropped, unclosed tags are closed at the end, and tags closed out of
//! order are reopened. Each repair is logged as a warning.
//!
//! ### 3. Tree ([`tree`] module)
//!
//! [`Node`] is either text or an [`Element`] with a name, an unparsed
//! attribute string and children. [`Node::render_as_text`] flattens a subtree
//! back to plain text, which renderers use for file names, link targets and
//! tooltip keys.
//!
//! [Logos]: https://docs.rs/logos
//!
//! ## Quick Start
//!
//! ```
//! use dsl_gls_syntax::{parse, Node};
//!
//! let tree = parse("\t[m1][b]Foo[/b] bar[/m]\n", "Foo");
//!
//! let m1 = tree.children[0].as_element().unwrap();
//! assert_eq!(m1.name, "m1");
//! assert_eq!(tree.render_as_text(), "Foo bar");
//! ```

pub mod lexer;
pub mod parser;
pub mod tree;

pub use parser::parse;
pub use tree::{Element, Node};
