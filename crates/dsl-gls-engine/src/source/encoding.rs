//! Source text encodings and their detection.
//!
//! DSL sources are either UTF-16 (usually with a byte order mark), UTF-8, or
//! a Windows code page named by the `#SOURCE_CODE_PAGE` header directive.

use encoding_rs::Encoding;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DslEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
    Windows1250,
    Windows1251,
    Windows1252,
    Windows1253,
    Windows1254,
    Windows1257,
    Windows1258,
}

/// Result of looking at the first bytes of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sniffed {
    /// The encoding is certain (byte order mark or UTF-16 zero-byte pattern).
    Exact(DslEncoding),
    /// Some 8-bit or UTF-8 text; the header decides.
    EightBit,
}

impl DslEncoding {
    pub fn encoding(self) -> &'static Encoding {
        match self {
            DslEncoding::Utf8 => encoding_rs::UTF_8,
            DslEncoding::Utf16Le => encoding_rs::UTF_16LE,
            DslEncoding::Utf16Be => encoding_rs::UTF_16BE,
            DslEncoding::Windows1250 => encoding_rs::WINDOWS_1250,
            DslEncoding::Windows1251 => encoding_rs::WINDOWS_1251,
            DslEncoding::Windows1252 => encoding_rs::WINDOWS_1252,
            DslEncoding::Windows1253 => encoding_rs::WINDOWS_1253,
            DslEncoding::Windows1254 => encoding_rs::WINDOWS_1254,
            DslEncoding::Windows1257 => encoding_rs::WINDOWS_1257,
            DslEncoding::Windows1258 => encoding_rs::WINDOWS_1258,
        }
    }

    pub fn name(self) -> &'static str {
        self.encoding().name()
    }

    /// Width in bytes of one code unit; line breaks are searched unit-wise.
    pub fn unit_width(self) -> usize {
        match self {
            DslEncoding::Utf16Le | DslEncoding::Utf16Be => 2,
            _ => 1,
        }
    }

    pub fn line_feed(self) -> &'static [u8] {
        match self {
            DslEncoding::Utf16Le => &[0x0A, 0x00],
            DslEncoding::Utf16Be => &[0x00, 0x0A],
            _ => b"\n",
        }
    }

    pub fn carriage_return(self) -> &'static [u8] {
        match self {
            DslEncoding::Utf16Le => &[0x0D, 0x00],
            DslEncoding::Utf16Be => &[0x00, 0x0D],
            _ => b"\r",
        }
    }

    /// Strict decode; `None` when the bytes are malformed for this encoding.
    pub fn decode(self, bytes: &[u8]) -> Option<String> {
        self.encoding()
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(|text| text.into_owned())
    }

    /// Maps a `#SOURCE_CODE_PAGE` value to an encoding.
    pub fn from_code_page(name: &str) -> Option<Self> {
        let encoding = match name.trim().to_ascii_lowercase().as_str() {
            "latin" => DslEncoding::Windows1252,
            "cyrillic" => DslEncoding::Windows1251,
            "easterneuropean" => DslEncoding::Windows1250,
            "greek" => DslEncoding::Windows1253,
            "turkish" => DslEncoding::Windows1254,
            "baltic" => DslEncoding::Windows1257,
            "vietnamese" => DslEncoding::Windows1258,
            "utf-8" | "utf8" => DslEncoding::Utf8,
            _ => return None,
        };
        Some(encoding)
    }
}

/// Inspects the start of a source. Returns what was found and the length of
/// the byte order mark to skip.
pub fn sniff(bytes: &[u8]) -> (Sniffed, usize) {
    match bytes {
        [0xFF, 0xFE, ..] => (Sniffed::Exact(DslEncoding::Utf16Le), 2),
        [0xFE, 0xFF, ..] => (Sniffed::Exact(DslEncoding::Utf16Be), 2),
        [0xEF, 0xBB, 0xBF, ..] => (Sniffed::Exact(DslEncoding::Utf8), 3),
        [first, 0, ..] if *first != 0 => (Sniffed::Exact(DslEncoding::Utf16Le), 0),
        [0, second, ..] if *second != 0 => (Sniffed::Exact(DslEncoding::Utf16Be), 0),
        _ => (Sniffed::EightBit, 0),
    }
}

/// Picks the encoding of an 8-bit source: a declared code page wins, then
/// UTF-8 if the text is valid UTF-8, then windows-1252.
pub fn resolve_eight_bit(code_page: Option<&str>, bytes: &[u8]) -> DslEncoding {
    if let Some(name) = code_page {
        match DslEncoding::from_code_page(name) {
            Some(encoding) => return encoding,
            None => log::warn!("unknown source code page \"{name}\", guessing the encoding"),
        }
    }
    if std::str::from_utf8(bytes).is_ok() {
        DslEncoding::Utf8
    } else {
        DslEncoding::Windows1252
    }
}
