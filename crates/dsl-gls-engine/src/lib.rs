//! Indexing, lookup and HTML rendering of Lingvo DSL dictionaries.
//!
//! Opening a dictionary scans the source once and records, for each
//! article, its byte range and its expanded headwords. Articles are read
//! back on demand from the (possibly dictzip-compressed) container,
//! resolved for one headword and rendered to HTML.
//!
//! ```no_run
//! use dsl_gls_engine::{DEFAULT_DICTIONARY_ID, DslDictionary};
//! use std::path::Path;
//!
//! let dict = DslDictionary::open(Path::new("En-De.dsl"), None, DEFAULT_DICTIONARY_ID)?;
//! for card in dict.cards() {
//!     println!("{}: {}", card.headwords.join("|"), dict.article_html(card));
//! }
//! # Ok::<(), dsl_gls_engine::DslError>(())
//! ```

pub mod article;
pub mod dictionary;
pub mod error;
pub mod glossary;
pub mod headword;
pub mod index;
pub mod io;
pub mod lang;
pub mod render;
pub mod source;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use article::{ResolvedArticle, resolve_article};
pub use dictionary::{ARTICLE_ERROR_HTML, DEFAULT_DICTIONARY_ID, DictionaryParameters, DslDictionary};
pub use error::{DslError, Result};
pub use glossary::write_glossary;
pub use index::{AbbreviationTable, Card, IndexStats};
pub use io::{annotation_description, find_abbreviation_file};
pub use lang::{BuiltinLanguages, LanguageTable};
pub use render::{RenderedHtml, Renderer};
pub use source::{ByteRangeReader, DslEncoding, LineScanner, open_container};
