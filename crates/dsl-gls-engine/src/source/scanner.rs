//! Line scanner over a decoded DSL source.
//!
//! The scanner hands out logical lines with the byte offset of their first
//! physical line in the original (decompressed) stream. `{{...}}` comments
//! are removed first; a comment that stays open at the end of a line
//! swallows the following lines until it is closed.

use crate::error::{DslError, Result};
use crate::source::container::ByteRangeReader;
use crate::source::encoding::{DslEncoding, Sniffed, resolve_eight_bit, sniff};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub text: String,
    /// Byte offset of the line's first physical line.
    pub offset: u64,
}

impl Line {
    pub fn is_blank(&self) -> bool {
        self.text.chars().all(is_dsl_blank)
    }

    /// Body lines (and garbage between articles) start with a blank.
    pub fn is_indented(&self) -> bool {
        self.text.starts_with(is_dsl_blank)
    }
}

/// Blanks as DSL understands them: space and tab only.
pub fn is_dsl_blank(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Header directives found at the top of a source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceHeader {
    pub name: String,
    pub index_language: String,
    pub contents_language: String,
    pub source_code_page: Option<String>,
}

pub struct LineScanner {
    data: Vec<u8>,
    pos: usize,
    encoding: DslEncoding,
    header: SourceHeader,
    lines_read: usize,
    /// First line after the header, read while parsing the header.
    pending: Option<Line>,
}

impl LineScanner {
    /// Reads the whole source through `reader` and parses its header.
    pub fn open(reader: &dyn ByteRangeReader) -> Result<Self> {
        Self::new(reader.read_all()?)
    }

    /// Detects the encoding of `data` and parses the header directives.
    pub fn new(data: Vec<u8>) -> Result<Self> {
        let (sniffed, bom_len) = sniff(&data);
        let encoding = match sniffed {
            Sniffed::Exact(encoding) => encoding,
            Sniffed::EightBit => {
                let code_page = declared_code_page(&data[bom_len..]);
                resolve_eight_bit(code_page.as_deref(), &data[bom_len..])
            }
        };
        log::debug!("source encoding is {}", encoding.name());

        let mut scanner = Self {
            data,
            pos: bom_len,
            encoding,
            header: SourceHeader::default(),
            lines_read: 0,
            pending: None,
        };
        scanner.read_header()?;
        Ok(scanner)
    }

    pub fn encoding(&self) -> DslEncoding {
        self.encoding
    }

    pub fn header(&self) -> &SourceHeader {
        &self.header
    }

    /// Number of physical lines consumed so far; also the 1-based number of
    /// the last line handed out.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    /// Offset of the next unread byte; the source length at end of input.
    pub fn position(&self) -> u64 {
        match &self.pending {
            Some(line) => line.offset,
            None => self.pos as u64,
        }
    }

    /// Next logical line with comments removed, or `None` at end of input.
    pub fn next_line(&mut self) -> Result<Option<Line>> {
        if let Some(line) = self.pending.take() {
            return Ok(Some(line));
        }
        self.read_logical()
    }

    fn read_header(&mut self) -> Result<()> {
        while let Some(line) = self.read_logical()? {
            let text = line.text.trim();
            if text.is_empty() {
                continue;
            }
            let Some(directive) = text.strip_prefix('#') else {
                self.pending = Some(line);
                break;
            };

            let (key, value) = directive
                .split_once(is_dsl_blank)
                .unwrap_or((directive, ""));
            let value = unquote(value.trim());
            match key {
                "NAME" => self.header.name = value.to_string(),
                "INDEX_LANGUAGE" => self.header.index_language = value.to_string(),
                "CONTENTS_LANGUAGE" => self.header.contents_language = value.to_string(),
                "SOURCE_CODE_PAGE" => self.header.source_code_page = Some(value.to_string()),
                other => log::debug!("ignoring header directive #{other}"),
            }
        }
        Ok(())
    }

    fn read_logical(&mut self) -> Result<Option<Line>> {
        let mut in_comment = false;
        let mut logical: Option<Line> = None;

        loop {
            let Some((text, offset)) = self.read_physical()? else {
                if in_comment {
                    log::warn!("comment left open at end of input");
                }
                return Ok(logical);
            };
            let stripped = strip_comments(&text, &mut in_comment);
            match logical.as_mut() {
                Some(line) => line.text.push_str(&stripped),
                None => {
                    logical = Some(Line {
                        text: stripped,
                        offset,
                    })
                }
            }
            if !in_comment {
                return Ok(logical);
            }
        }
    }

    fn read_physical(&mut self) -> Result<Option<(String, u64)>> {
        if self.pos >= self.data.len() {
            return Ok(None);
        }

        let start = self.pos;
        let width = self.encoding.unit_width();
        let line_feed = self.encoding.line_feed();
        let end = (start..self.data.len())
            .step_by(width)
            .find(|&i| self.data[i..].starts_with(line_feed))
            .unwrap_or(self.data.len());
        self.pos = (end + width).min(self.data.len());
        self.lines_read += 1;

        let mut raw = &self.data[start..end];
        if let Some(without_cr) = raw.strip_suffix(self.encoding.carriage_return()) {
            raw = without_cr;
        }
        let text = self.encoding.decode(raw).ok_or(DslError::Decode {
            line: self.lines_read,
            offset: start as u64,
            encoding: self.encoding.name(),
        })?;
        Ok(Some((text, start as u64)))
    }
}

/// Removes `{{...}}` comments. `in_comment` carries an unterminated comment
/// over to the next call.
pub fn strip_comments(text: &str, in_comment: &mut bool) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    loop {
        if *in_comment {
            match rest.find("}}") {
                Some(end) => {
                    rest = &rest[end + 2..];
                    *in_comment = false;
                }
                None => return out,
            }
        }
        match rest.find("{{") {
            Some(start) => {
                out.push_str(&rest[..start]);
                rest = &rest[start + 2..];
                *in_comment = true;
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Looks for `#SOURCE_CODE_PAGE` among the leading header lines of an 8-bit
/// source. Header lines are ASCII, so no decoding is needed.
fn declared_code_page(data: &[u8]) -> Option<String> {
    for raw in data.split(|&b| b == b'\n') {
        let line = String::from_utf8_lossy(raw);
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let directive = line.strip_prefix('#')?;
        if let Some(value) = directive.strip_prefix("SOURCE_CODE_PAGE") {
            return Some(unquote(value.trim()).to_string());
        }
    }
    None
}
