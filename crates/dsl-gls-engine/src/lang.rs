//! Language names and ids used by DSL headers and `[lang]` tags.

/// Lookup of language names, numeric ids and two-letter codes.
///
/// Passed explicitly to the dictionary and renderer so tests can use a
/// minimal table.
pub trait LanguageTable: Send + Sync {
    /// Numeric id of a DSL language name such as `English` or `GermanNewSpelling`.
    fn id_for_name(&self, name: &str) -> Option<u32>;

    /// ISO 639-1 code for a numeric id, as used in `[lang id=...]`.
    fn code_for_id(&self, id: u32) -> Option<&str>;

    /// Whether the named language is written right to left.
    fn is_rtl(&self, name: &str) -> bool;
}

struct Language {
    id: u32,
    name: &'static str,
    code: &'static str,
    rtl: bool,
}

const fn lang(id: u32, name: &'static str, code: &'static str) -> Language {
    Language {
        id,
        name,
        code,
        rtl: false,
    }
}

const fn rtl(id: u32, name: &'static str, code: &'static str) -> Language {
    Language {
        id,
        name,
        code,
        rtl: true,
    }
}

/// Windows language ids paired with the names DSL headers use. Variant
/// names map to the id of their base language.
const LANGUAGES: &[Language] = &[
    lang(1033, "English", "en"),
    lang(1049, "Russian", "ru"),
    lang(1031, "German", "de"),
    lang(1031, "GermanNewSpelling", "de"),
    lang(1036, "French", "fr"),
    lang(1034, "Spanish", "es"),
    lang(1034, "SpanishTraditionalSort", "es"),
    lang(1034, "SpanishModernSort", "es"),
    lang(1040, "Italian", "it"),
    lang(1058, "Ukrainian", "uk"),
    lang(1059, "Belarusian", "be"),
    lang(1045, "Polish", "pl"),
    lang(1029, "Czech", "cs"),
    lang(1051, "Slovak", "sk"),
    lang(1060, "Slovenian", "sl"),
    lang(1050, "Croatian", "hr"),
    lang(2074, "Serbian", "sr"),
    lang(1026, "Bulgarian", "bg"),
    lang(1038, "Hungarian", "hu"),
    lang(1048, "Romanian", "ro"),
    lang(1043, "Dutch", "nl"),
    lang(2070, "Portuguese", "pt"),
    lang(1046, "PortugueseBrazilian", "pt"),
    lang(1053, "Swedish", "sv"),
    lang(1030, "Danish", "da"),
    lang(1044, "Norwegian", "no"),
    lang(1044, "NorwegianBokmal", "no"),
    lang(1035, "Finnish", "fi"),
    lang(1061, "Estonian", "et"),
    lang(1062, "Latvian", "lv"),
    lang(1063, "Lithuanian", "lt"),
    lang(1039, "Icelandic", "is"),
    lang(1032, "Greek", "el"),
    lang(1055, "Turkish", "tr"),
    lang(1087, "Kazakh", "kk"),
    lang(1079, "Georgian", "ka"),
    lang(1067, "Armenian", "hy"),
    lang(1068, "Azeri", "az"),
    lang(1142, "Latin", "la"),
    lang(2052, "Chinese", "zh"),
    lang(2052, "ChinesePRC", "zh"),
    lang(1028, "ChineseTaiwan", "zh"),
    lang(1041, "Japanese", "ja"),
    lang(1042, "Korean", "ko"),
    lang(1054, "Thai", "th"),
    lang(1066, "Vietnamese", "vi"),
    lang(1057, "Indonesian", "id"),
    lang(1081, "Hindi", "hi"),
    rtl(1025, "Arabic", "ar"),
    rtl(1037, "Hebrew", "he"),
    rtl(1065, "Persian", "fa"),
    rtl(1065, "Farsi", "fa"),
    rtl(1056, "Urdu", "ur"),
    rtl(1085, "Yiddish", "yi"),
];

/// The built-in table covering the languages Lingvo ships.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinLanguages;

impl BuiltinLanguages {
    fn by_name(name: &str) -> Option<&'static Language> {
        let name = name.trim();
        LANGUAGES.iter().find(|l| l.name.eq_ignore_ascii_case(name))
    }
}

impl LanguageTable for BuiltinLanguages {
    fn id_for_name(&self, name: &str) -> Option<u32> {
        Self::by_name(name).map(|l| l.id)
    }

    fn code_for_id(&self, id: u32) -> Option<&str> {
        LANGUAGES.iter().find(|l| l.id == id).map(|l| l.code)
    }

    fn is_rtl(&self, name: &str) -> bool {
        Self::by_name(name).is_some_and(|l| l.rtl)
    }
}
