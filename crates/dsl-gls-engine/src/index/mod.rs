//! Card index: which byte ranges of the source hold which headwords.

mod abbreviations;
mod builder;

pub use abbreviations::AbbreviationTable;
pub use builder::{CardIndexer, index_cards};

use serde::Serialize;

/// One indexed dictionary entry.
///
/// `headwords` are unescaped and blank-normalized, in source order. Cards
/// of embedded articles share a sub-range of their parent's range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub offset: u64,
    pub size: u64,
    pub headwords: Vec<String>,
}

impl Card {
    pub fn end(&self) -> u64 {
        self.offset + self.size
    }

    /// Whether this card's range lies within `other`'s.
    pub fn is_inside(&self, other: &Card) -> bool {
        self.offset >= other.offset && self.end() <= other.end()
    }
}

/// An `@` article found inside another article's body. Only lives during
/// indexing; its headwords are raw (unsorted parts stripped, tildes
/// expanded, optional parts not yet expanded).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsidedCard {
    pub offset: u64,
    pub size: u64,
    pub headwords: Vec<String>,
}

/// Advisory counters reported after indexing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub articles: usize,
    pub words: usize,
}
