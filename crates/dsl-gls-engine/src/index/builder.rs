use crate::error::Result;
use crate::headword::{expand_headword_line, finish_headword, is_at_sign_first, optional_variants};
use crate::headword::{UnsortedParts, expand_tildes, process_unsorted_parts};
use crate::source::{Line, LineScanner, is_dsl_blank};

use super::{Card, IndexStats, InsidedCard};

/// Indexes every card of a source.
///
/// Decode errors are fatal and carry the line the scanner had reached;
/// everything else is a warning.
pub fn index_cards(scanner: &mut LineScanner) -> Result<(Vec<Card>, IndexStats)> {
    let mut indexer = CardIndexer::new();
    loop {
        let line = scanner
            .next_line()
            .map_err(|e| e.at_line(scanner.lines_read()))?;
        let Some(line) = line else { break };
        indexer.push(&line, scanner.lines_read());
    }

    let (cards, stats) = indexer.finish(scanner.position());
    log::info!(
        "indexed {} articles with {} headwords into {} cards",
        stats.articles,
        stats.words,
        cards.len()
    );
    Ok((cards, stats))
}

#[derive(Debug)]
enum IndexState {
    SeekHeadword,
    ReadMoreHeadwords {
        offset: u64,
        variants: Vec<String>,
    },
    ReadBody {
        offset: u64,
        headwords: Vec<String>,
        /// Raw first headword variant, the tilde value for `@` headwords.
        tilde_value: String,
        embedded: EmbeddedCards,
    },
}

#[derive(Debug, Default)]
struct EmbeddedCards {
    open: Option<OpenEmbedded>,
    closed: Vec<InsidedCard>,
}

#[derive(Debug)]
struct OpenEmbedded {
    offset: u64,
    headwords: Vec<String>,
    content_lines: usize,
    marker_line: usize,
}

impl EmbeddedCards {
    fn close(&mut self, end: u64) {
        let Some(open) = self.open.take() else {
            return;
        };
        if !open.headwords.is_empty() {
            self.closed.push(InsidedCard {
                offset: open.offset,
                size: end - open.offset,
                headwords: open.headwords,
            });
        }
    }

    fn push_content(&mut self) {
        if let Some(open) = self.open.as_mut() {
            open.content_lines += 1;
        }
    }

    /// Handles an `@` marker line carrying `header` (possibly empty).
    fn marker(&mut self, line: &Line, line_number: usize, header: String) {
        let chains = self
            .open
            .as_ref()
            .is_some_and(|open| open.content_lines == 0);

        if header.is_empty() {
            self.close(line.offset);
            return;
        }

        if chains {
            if let Some(open) = self.open.as_mut() {
                open.headwords.push(header);
                open.marker_line = line_number;
            }
            return;
        }

        self.close(line.offset);
        self.open = Some(OpenEmbedded {
            offset: line.offset,
            headwords: vec![header],
            content_lines: 0,
            marker_line: line_number,
        });
    }
}

/// Line-driven state machine turning scanner output into cards.
pub struct CardIndexer {
    state: IndexState,
    cards: Vec<Card>,
    stats: IndexStats,
}

impl Default for CardIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl CardIndexer {
    pub fn new() -> Self {
        Self {
            state: IndexState::SeekHeadword,
            cards: Vec::new(),
            stats: IndexStats::default(),
        }
    }

    /// Feeds the next logical line; `line_number` is used in warnings.
    pub fn push(&mut self, line: &Line, line_number: usize) {
        match &mut self.state {
            IndexState::SeekHeadword => self.seek_headword(line),
            IndexState::ReadMoreHeadwords { offset, variants } => {
                if line.text.is_empty() {
                    return;
                }
                if !line.is_indented() {
                    expand_headword_line(&line.text, variants);
                    return;
                }
                let offset = *offset;
                let variants = std::mem::take(variants);
                self.start_body(offset, variants);
                self.body_line(line, line_number);
            }
            IndexState::ReadBody { .. } => {
                if !line.text.is_empty() && !line.is_indented() {
                    self.commit(line.offset);
                    self.seek_headword(line);
                } else {
                    self.body_line(line, line_number);
                }
            }
        }
    }

    /// Commits whatever is in progress; `end` is the length of the source.
    pub fn finish(mut self, end: u64) -> (Vec<Card>, IndexStats) {
        if let IndexState::ReadMoreHeadwords { offset, variants } = &mut self.state {
            log::warn!("premature end of file in the headwords at offset {offset:#x}");
            let offset = *offset;
            let variants = std::mem::take(variants);
            self.start_body(offset, variants);
        }
        self.commit(end);
        (self.cards, self.stats)
    }

    fn seek_headword(&mut self, line: &Line) {
        if line.text.is_empty() {
            return;
        }
        if line.is_indented() {
            if !line.is_blank() {
                log::warn!("garbage line at offset {:#x}", line.offset);
            }
            return;
        }

        let mut variants = Vec::new();
        expand_headword_line(&line.text, &mut variants);
        self.state = IndexState::ReadMoreHeadwords {
            offset: line.offset,
            variants,
        };
    }

    fn start_body(&mut self, offset: u64, variants: Vec<String>) {
        let tilde_value = variants.first().cloned().unwrap_or_default();
        let headwords: Vec<String> = variants.iter().map(|v| finish_headword(v)).collect();
        self.stats.articles += 1;
        self.stats.words += headwords.len();
        self.state = IndexState::ReadBody {
            offset,
            headwords,
            tilde_value,
            embedded: EmbeddedCards::default(),
        };
    }

    fn body_line(&mut self, line: &Line, line_number: usize) {
        let IndexState::ReadBody {
            tilde_value,
            embedded,
            ..
        } = &mut self.state
        else {
            return;
        };

        let text = &line.text;
        let marker = match text.find('@') {
            Some(at) if !text[..at].ends_with('\\') => {
                if is_at_sign_first(text) {
                    Some(at)
                } else {
                    log::warn!("unescaped '@' at line {line_number}");
                    None
                }
            }
            _ => None,
        };

        let Some(at) = marker else {
            embedded.push_content();
            return;
        };

        let header = text[at + 1..].trim_matches(is_dsl_blank);
        let header = if header.is_empty() {
            String::new()
        } else {
            let stripped = process_unsorted_parts(header, UnsortedParts::Strip);
            expand_tildes(&stripped, tilde_value)
        };
        embedded.marker(line, line_number, header);
    }

    /// Closes the article in progress at `end` and emits its cards.
    fn commit(&mut self, end: u64) {
        let state = std::mem::replace(&mut self.state, IndexState::SeekHeadword);
        let IndexState::ReadBody {
            offset,
            headwords,
            mut embedded,
            ..
        } = state
        else {
            return;
        };

        if let Some(open) = &embedded.open {
            log::warn!("unclosed '@' at line {}", open.marker_line);
        }
        embedded.close(end);

        self.cards.push(Card {
            offset,
            size: end - offset,
            headwords,
        });

        for insided in embedded.closed {
            for raw in &insided.headwords {
                let headwords: Vec<String> = optional_variants(raw)
                    .iter()
                    .map(|v| finish_headword(v))
                    .collect();
                self.stats.words += headwords.len();
                self.cards.push(Card {
                    offset: insided.offset,
                    size: insided.size,
                    headwords,
                });
            }
            self.stats.articles += 1;
        }
    }
}
