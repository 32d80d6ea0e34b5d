//! Companion files that sit next to a dictionary source.

use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::error::Result;
use crate::source::open_container;

const SOURCE_SUFFIXES: [&str; 2] = [".dsl.dz", ".dsl"];

/// The source path without its `.dsl` or `.dsl.dz` suffix, matched
/// case-insensitively. `None` for any other file name.
pub fn source_base(source: &Path) -> Option<PathBuf> {
    let name = source.to_str()?;
    let lower = name.to_ascii_lowercase();
    SOURCE_SUFFIXES
        .iter()
        .find(|suffix| lower.ends_with(*suffix))
        .map(|suffix| PathBuf::from(&name[..name.len() - suffix.len()]))
}

/// Looks for `<base>_abrv.dsl`, then `<base>_abrv.dsl.dz`.
pub fn find_abbreviation_file(source: &Path) -> Option<PathBuf> {
    let base = source_base(source)?;
    let base = base.to_str()?;
    ["_abrv.dsl", "_abrv.dsl.dz"]
        .iter()
        .map(|suffix| PathBuf::from(format!("{base}{suffix}")))
        .find(|candidate| candidate.is_file())
}

/// Description built from the `<base>.ann` annotation file, if there is one.
///
/// `#LANGUAGE "Name"` directives become `Name:` headings and line breaks
/// become `<br>`.
pub fn annotation_description(source: &Path) -> Result<Option<String>> {
    let Some(base) = source_base(source) else {
        return Ok(None);
    };
    let mut path = base.into_os_string();
    path.push(".ann");
    let path = PathBuf::from(path);
    if !path.is_file() {
        return Ok(None);
    }

    let reader = open_container(&path)?;
    let bytes = reader.read_all()?;
    // UTF-8 unless a byte order mark says otherwise.
    let (text, _, _) = encoding_rs::UTF_8.decode(&bytes);
    log::debug!("read annotation {}", path.display());
    Ok(Some(format_annotation(&text)))
}

fn language_regex() -> &'static Regex {
    static LANGUAGE_REGEX: OnceLock<Regex> = OnceLock::new();
    LANGUAGE_REGEX
        .get_or_init(|| Regex::new(r#"#LANGUAGE "(\w+)""#).expect("Invalid language regex"))
}

fn format_annotation(text: &str) -> String {
    let mut first = true;
    let text = language_regex().replace_all(text, |caps: &regex::Captures<'_>| {
        let heading = format!("{}:", &caps[1]);
        if std::mem::take(&mut first) {
            heading
        } else {
            format!("<br><br><br><br>{heading}")
        }
    });
    text.replace('\r', "").replace('\n', "<br>")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};
    use pretty_assertions::assert_eq;

    #[test]
    fn base_strips_either_suffix_ignoring_case() {
        assert_eq!(
            source_base(Path::new("/d/En-De.DSL")),
            Some(PathBuf::from("/d/En-De"))
        );
        assert_eq!(
            source_base(Path::new("/d/en.dsl.dz")),
            Some(PathBuf::from("/d/en"))
        );
        assert_eq!(source_base(Path::new("/d/en.txt")), None);
    }

    #[test]
    fn plain_abbreviations_are_preferred() {
        let dir = create_test_dir();
        let source = create_test_file(dir.path(), "dict.dsl", "w\n\tx\n");
        create_test_file(dir.path(), "dict_abrv.dsl.dz", "");
        let plain = create_test_file(dir.path(), "dict_abrv.dsl", "");

        assert_eq!(find_abbreviation_file(&source), Some(plain));
    }

    #[test]
    fn compressed_abbreviations_are_found() {
        let dir = create_test_dir();
        let source = dir.path().join("dict.dsl.dz");
        let packed = create_test_file(dir.path(), "dict_abrv.dsl.dz", "");

        assert_eq!(find_abbreviation_file(&source), Some(packed));
    }

    #[test]
    fn no_abbreviations_next_to_source() {
        let dir = create_test_dir();
        assert_eq!(find_abbreviation_file(&dir.path().join("dict.dsl")), None);
        assert_eq!(find_abbreviation_file(&dir.path().join("dict.bin")), None);
    }

    #[test]
    fn annotation_languages_become_headings() {
        let dir = create_test_dir();
        create_test_file(
            dir.path(),
            "dict.ann",
            "#LANGUAGE \"English\"\r\nAbout it\r\n#LANGUAGE \"Russian\"\r\nO slovare",
        );
        let description = annotation_description(&dir.path().join("dict.dsl")).unwrap();
        assert_eq!(
            description.as_deref(),
            Some("English:<br>About it<br><br><br><br><br>Russian:<br>O slovare")
        );
    }

    #[test]
    fn utf16_annotation_is_decoded() {
        let dir = create_test_dir();
        let mut bytes = vec![0xff, 0xfe];
        bytes.extend("Hi\n".encode_utf16().flat_map(u16::to_le_bytes));
        std::fs::write(dir.path().join("dict.ann"), bytes).unwrap();

        let description = annotation_description(&dir.path().join("dict.dsl.dz")).unwrap();
        assert_eq!(description.as_deref(), Some("Hi<br>"));
    }

    #[test]
    fn missing_annotation_is_none() {
        let dir = create_test_dir();
        let description = annotation_description(&dir.path().join("dict.dsl")).unwrap();
        assert_eq!(description, None);
    }
}
