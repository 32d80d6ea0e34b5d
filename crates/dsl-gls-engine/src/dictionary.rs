//! An opened dictionary: header parameters, card index, abbreviation table
//! and the container the articles are read back from.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;

use serde::Serialize;

use crate::article::{ResolvedArticle, resolve_article};
use crate::error::{DslError, Result};
use crate::headword::{expand_tildes, fold};
use crate::index::{AbbreviationTable, Card, IndexStats, index_cards};
use crate::lang::{BuiltinLanguages, LanguageTable};
use crate::render::Renderer;
use crate::source::{ByteRangeReader, DslEncoding, LineScanner, is_dsl_blank, open_container};

/// Host used in resource URLs when no dictionary id is configured.
pub const DEFAULT_DICTIONARY_ID: &str = "xxxxxxxxxxxxxxxxxxxxxxxxxxxxxxxx";

/// Shown instead of an article that cannot be read or rendered.
pub const ARTICLE_ERROR_HTML: &str = "<span class=\"dsl_article\">Article loading error</span>";

const EXPAND_ICON: &str = "qrcx://localhost/icons/expand_opt.png";

/// Values from the `#NAME`, `#INDEX_LANGUAGE` and `#CONTENTS_LANGUAGE`
/// directives plus the detected encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionaryParameters {
    pub name: String,
    pub lang_from: String,
    pub lang_to: String,
    pub encoding: DslEncoding,
    pub lang_from_rtl: bool,
    pub lang_to_rtl: bool,
}

pub struct DslDictionary {
    id: String,
    params: DictionaryParameters,
    cards: Vec<Card>,
    stats: IndexStats,
    abbreviations: AbbreviationTable,
    languages: Box<dyn LanguageTable>,
    reader: Box<dyn ByteRangeReader>,
}

impl std::fmt::Debug for DslDictionary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DslDictionary")
            .field("id", &self.id)
            .field("params", &self.params)
            .field("cards", &self.cards.len())
            .field("abbreviations", &self.abbreviations.len())
            .finish()
    }
}

impl DslDictionary {
    /// Opens and indexes `source`, with the built-in language table.
    pub fn open(source: &Path, abbreviations: Option<&Path>, dictionary_id: &str) -> Result<Self> {
        Self::open_with_languages(
            source,
            abbreviations,
            dictionary_id,
            Box::new(BuiltinLanguages),
        )
    }

    pub fn open_with_languages(
        source: &Path,
        abbreviations: Option<&Path>,
        dictionary_id: &str,
        languages: Box<dyn LanguageTable>,
    ) -> Result<Self> {
        let abbreviations = match abbreviations {
            Some(path) => {
                log::info!("loading abbreviations from {}", path.display());
                let reader = open_container(path)?;
                let mut scanner = LineScanner::open(reader.as_ref())?;
                AbbreviationTable::build(&mut scanner)?
            }
            None => AbbreviationTable::default(),
        };

        log::info!("indexing {}", source.display());
        let reader = open_container(source)?;
        Self::from_reader(reader, abbreviations, dictionary_id, languages)
    }

    /// Indexes an already opened container.
    pub fn from_reader(
        reader: Box<dyn ByteRangeReader>,
        abbreviations: AbbreviationTable,
        dictionary_id: &str,
        languages: Box<dyn LanguageTable>,
    ) -> Result<Self> {
        let mut scanner = LineScanner::open(reader.as_ref())?;
        let header = scanner.header().clone();
        let params = DictionaryParameters {
            lang_from_rtl: languages.is_rtl(&header.index_language),
            lang_to_rtl: languages.is_rtl(&header.contents_language),
            name: header.name,
            lang_from: header.index_language,
            lang_to: header.contents_language,
            encoding: scanner.encoding(),
        };
        let (cards, stats) = index_cards(&mut scanner)?;

        Ok(Self {
            id: dictionary_id.to_string(),
            params,
            cards,
            stats,
            abbreviations,
            languages,
            reader,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn params(&self) -> &DictionaryParameters {
        &self.params
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    pub fn abbreviations(&self) -> &AbbreviationTable {
        &self.abbreviations
    }

    /// Re-reads `card` and resolves it for the folded key `requested`.
    pub fn resolve(&self, card: &Card, requested: &str) -> Result<ResolvedArticle> {
        resolve_article(self.reader.as_ref(), self.params.encoding, card, requested)
    }

    pub fn renderer(&self) -> Renderer<'_> {
        Renderer::new(&self.id, &self.abbreviations, self.languages.as_ref())
    }

    /// HTML of the article behind `card`, shown for its first headword.
    ///
    /// Never fails: read errors and panics while rendering yield
    /// [`ARTICLE_ERROR_HTML`].
    pub fn article_html(&self, card: &Card) -> String {
        match catch_unwind(AssertUnwindSafe(|| self.try_article_html(card))) {
            Ok(Ok(html)) => html,
            Ok(Err(e)) => {
                log::warn!("cannot load article at offset {:#x}: {e}", card.offset);
                ARTICLE_ERROR_HTML.to_string()
            }
            Err(_) => {
                log::warn!("rendering the article at offset {:#x} panicked", card.offset);
                ARTICLE_ERROR_HTML.to_string()
            }
        }
    }

    fn try_article_html(&self, card: &Card) -> Result<String> {
        let first = card
            .headwords
            .first()
            .ok_or_else(|| DslError::InvalidArticle {
                offset: card.offset,
                reason: "card has no headwords".to_string(),
            })?;
        let resolved = self.resolve(card, &fold(first))?;

        let mut display = resolved.display_headword;
        if display.is_empty() || display.starts_with(is_dsl_blank) {
            display = first.clone();
        }

        let renderer = self.renderer();
        let head = if display == "<" {
            display.clone()
        } else {
            renderer.render_markup(&display, &display).html
        };
        let body_text = expand_tildes(&resolved.body, &resolved.tilde_value);
        let body = renderer.render_markup(&body_text, &display);

        let mut html = String::from("<div class=\"dsl_article\"><div class=\"dsl_headwords\"");
        if self.params.lang_from_rtl {
            html.push_str(" dir=\"rtl\"");
        }
        html.push_str("><p>");
        html.push_str(&head);
        if body.optional_parts > 0 {
            html.push(' ');
            html.push_str(&expand_button(&renderer.optional_id_prefix()));
        }
        html.push_str("</p></div><div class=\"dsl_definition\"");
        if self.params.lang_to_rtl {
            html.push_str(" dir=\"rtl\"");
        }
        html.push('>');
        html.push_str(&body.html);
        html.push_str("</div></div>");
        Ok(html)
    }
}

fn expand_button(prefix: &str) -> String {
    format!(
        "<img src=\"{EXPAND_ICON}\" class=\"hidden_expand_opt\" id=\"{prefix}_expand\" \
         onclick=\"gdExpandOptPart('{prefix}_expand','{prefix}_opt_')\" alt=\"[+]\"/>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemoryReader;
    use insta::assert_yaml_snapshot;
    use pretty_assertions::assert_eq;

    fn dictionary(source: &str) -> DslDictionary {
        DslDictionary::from_reader(
            Box::new(MemoryReader::new(source.as_bytes().to_vec())),
            AbbreviationTable::default(),
            "abcdefghij",
            Box::new(BuiltinLanguages),
        )
        .unwrap()
    }

    #[test]
    fn parameters_come_from_the_header() {
        let dict = dictionary(
            "#NAME \"Test\"\n#INDEX_LANGUAGE \"Arabic\"\n#CONTENTS_LANGUAGE \"English\"\n\nw\n\tx\n",
        );
        assert_yaml_snapshot!(dict.params(), @r"
        name: Test
        lang_from: Arabic
        lang_to: English
        encoding: Utf8
        lang_from_rtl: true
        lang_to_rtl: false
        ");
        assert_eq!(dict.cards().len(), 1);
        assert_eq!(dict.stats(), IndexStats { articles: 1, words: 1 });
    }

    #[test]
    fn article_html_wraps_head_and_body() {
        let dict = dictionary("cat\n\t[m1]a ~[/m]\n");
        assert_eq!(
            dict.article_html(&dict.cards()[0]),
            "<div class=\"dsl_article\"><div class=\"dsl_headwords\"><p>cat</p></div>\
             <div class=\"dsl_definition\"><div class=\"dsl_m1\">a cat</div></div></div>"
        );
    }

    #[test]
    fn rtl_languages_set_direction() {
        let dict = dictionary("#INDEX_LANGUAGE \"Hebrew\"\n#CONTENTS_LANGUAGE \"Arabic\"\nw\n\tx\n");
        let html = dict.article_html(&dict.cards()[0]);
        assert!(html.starts_with(
            "<div class=\"dsl_article\"><div class=\"dsl_headwords\" dir=\"rtl\"><p>"
        ));
        assert!(html.contains("<div class=\"dsl_definition\" dir=\"rtl\">"));
    }

    #[test]
    fn optional_parts_add_an_expand_button() {
        let dict = dictionary("w\n\t[*]extra[/*]\n");
        let html = dict.article_html(&dict.cards()[0]);
        assert!(html.contains(
            "<p>w <img src=\"qrcx://localhost/icons/expand_opt.png\" class=\"hidden_expand_opt\" \
             id=\"Oabcdefg_0_expand\" onclick=\"gdExpandOptPart('Oabcdefg_0_expand','Oabcdefg_0_opt_')\" \
             alt=\"[+]\"/></p>"
        ));
        assert!(html.contains("<span class=\"dsl_opt\" id=\"Oabcdefg_0_opt_0\">extra</span>"));
    }

    #[test]
    fn lone_angle_bracket_headword_is_written_raw() {
        let dict = dictionary("<\n\tless than\n");
        let html = dict.article_html(&dict.cards()[0]);
        assert!(html.contains("<p><</p>"));
    }

    #[test]
    fn unreadable_card_yields_placeholder() {
        let dict = dictionary("w\n\tx\n");
        let bogus = Card {
            offset: 1000,
            size: 5,
            headwords: vec!["w".to_string()],
        };
        assert_eq!(dict.article_html(&bogus), ARTICLE_ERROR_HTML);

        let headless = Card {
            offset: 0,
            size: 5,
            headwords: vec![],
        };
        assert_eq!(dict.article_html(&headless), ARTICLE_ERROR_HTML);
    }
}
