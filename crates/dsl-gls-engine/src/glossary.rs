//! Babylon glossary source (`.gls`) output.

use std::io::Write;

use crate::dictionary::DslDictionary;
use crate::error::Result;

/// Writes the glossary header followed by one entry per card.
///
/// Each entry is the card's headwords joined by `|`, then the article HTML,
/// then a blank line. The description line is only written when
/// `description` is given. Returns the number of entries written.
pub fn write_glossary<W: Write>(
    out: &mut W,
    dictionary: &DslDictionary,
    author: &str,
    description: Option<&str>,
) -> Result<usize> {
    let params = dictionary.params();
    writeln!(out, "### Glossary title:{}", params.name)?;
    writeln!(out, "### Author:{author}")?;
    if let Some(description) = description {
        writeln!(out, "### Description:{description}")?;
    }
    writeln!(out, "### Source language:{}", params.lang_from)?;
    writeln!(out, "### Target language:{}", params.lang_to)?;
    writeln!(out, "### Glossary section:")?;
    writeln!(out)?;

    let mut written = 0;
    for card in dictionary.cards() {
        let html = dictionary.article_html(card);
        writeln!(out, "{}", card.headwords.join("|"))?;
        writeln!(out, "{html}")?;
        writeln!(out)?;
        written += 1;
    }
    out.flush()?;

    log::info!("wrote {written} glossary entries");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::AbbreviationTable;
    use crate::lang::BuiltinLanguages;
    use crate::source::MemoryReader;
    use pretty_assertions::assert_eq;

    fn dictionary(source: &str) -> DslDictionary {
        DslDictionary::from_reader(
            Box::new(MemoryReader::new(source.as_bytes().to_vec())),
            AbbreviationTable::default(),
            "x",
            Box::new(BuiltinLanguages),
        )
        .unwrap()
    }

    fn glossary(dict: &DslDictionary, description: Option<&str>) -> String {
        let mut out = Vec::new();
        write_glossary(&mut out, dict, "me", description).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn header_and_entries() {
        let dict = dictionary(
            "#NAME \"Pets\"\n#INDEX_LANGUAGE \"English\"\n#CONTENTS_LANGUAGE \"German\"\n\
             cat\ncats\n\t[trn]Katze[/trn]\ndog\n\tHund\n",
        );
        let expected = concat!(
            "### Glossary title:Pets\n",
            "### Author:me\n",
            "### Source language:English\n",
            "### Target language:German\n",
            "### Glossary section:\n",
            "\n",
            "cat|cats\n",
            "<div class=\"dsl_article\"><div class=\"dsl_headwords\"><p>cat</p></div>",
            "<div class=\"dsl_definition\"><span class=\"dsl_trn\">Katze</span></div></div>\n",
            "\n",
            "dog\n",
            "<div class=\"dsl_article\"><div class=\"dsl_headwords\"><p>dog</p></div>",
            "<div class=\"dsl_definition\">Hund</div></div>\n",
            "\n",
        );
        assert_eq!(glossary(&dict, None), expected);
    }

    #[test]
    fn description_line_follows_author() {
        let dict = dictionary("#NAME \"D\"\nw\n\tx\n");
        let text = glossary(&dict, Some("About<br>it"));
        let lines: Vec<&str> = text.lines().take(4).collect();
        assert_eq!(
            lines,
            [
                "### Glossary title:D",
                "### Author:me",
                "### Description:About<br>it",
                "### Source language:",
            ]
        );
    }

    #[test]
    fn entry_count_is_returned() {
        let dict = dictionary("a\n\tx\nb\n\ty\nc\n\tz\n");
        let mut out = Vec::new();
        assert_eq!(write_glossary(&mut out, &dict, "", None).unwrap(), 3);
    }
}
