//! Byte-range access to dictionary sources.
//!
//! A source is either a plain `.dsl` file or a gzip-compressed `.dsl.dz`.
//! Dictzip files carry an `RA` extra field listing independently inflatable
//! chunks, so a card can be read without inflating the whole file. Gzip
//! files without that table are inflated once and kept in memory.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use flate2::read::MultiGzDecoder;
use flate2::{Decompress, FlushDecompress};

use crate::error::{DslError, Result};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

const FLAG_HCRC: u8 = 0x02;
const FLAG_EXTRA: u8 = 0x04;
const FLAG_NAME: u8 = 0x08;
const FLAG_COMMENT: u8 = 0x10;

/// Random access to the decompressed bytes of a source.
///
/// Implementations are shareable between threads; they serialize access to
/// the underlying file themselves.
pub trait ByteRangeReader: Send + Sync {
    /// Length of the decompressed stream.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Reads `len` bytes starting at `offset` of the decompressed stream.
    fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>>;

    fn read_all(&self) -> Result<Vec<u8>> {
        self.read_range(0, self.len())
    }
}

/// Opens a source, picking the reader by the gzip magic number.
pub fn open_container(path: &Path) -> Result<Box<dyn ByteRangeReader>> {
    if !path.exists() {
        return Err(DslError::NotFound(path.to_path_buf()));
    }

    let mut file = File::open(path)?;
    let mut magic = [0u8; 2];
    let is_gzip = match file.read_exact(&mut magic) {
        Ok(()) => magic == GZIP_MAGIC,
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => false,
        Err(e) => return Err(e.into()),
    };
    file.seek(SeekFrom::Start(0))?;

    if !is_gzip {
        log::debug!("opening {} as a plain file", path.display());
        return Ok(Box::new(PlainFileReader::new(file)?));
    }

    match DictZipReader::new(file)? {
        Some(reader) => {
            log::debug!(
                "opening {} as dictzip with {} chunks",
                path.display(),
                reader.chunk_sizes.len()
            );
            Ok(Box::new(reader))
        }
        None => {
            log::info!(
                "{} has no random access table, inflating it into memory",
                path.display()
            );
            let mut data = Vec::new();
            MultiGzDecoder::new(File::open(path)?)
                .read_to_end(&mut data)
                .map_err(|e| DslError::Container(format!("gzip decompression failed: {e}")))?;
            Ok(Box::new(MemoryReader::new(data)))
        }
    }
}

fn check_range(offset: u64, len: u64, total: u64) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= total => Ok(()),
        _ => Err(DslError::Container(format!(
            "range {offset:#x}+{len} is beyond the end of the source ({total} bytes)"
        ))),
    }
}

pub struct PlainFileReader {
    file: Mutex<File>,
    len: u64,
}

impl PlainFileReader {
    pub fn new(file: File) -> Result<Self> {
        let len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl ByteRangeReader for PlainFileReader {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        check_range(offset, len, self.len)?;
        let mut file = self.file.lock().map_err(|_| DslError::LockPoisoned)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buffer = vec![0u8; len as usize];
        file.read_exact(&mut buffer)?;
        Ok(buffer)
    }
}

/// A fully decompressed source held in memory.
pub struct MemoryReader {
    data: Vec<u8>,
}

impl MemoryReader {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl ByteRangeReader for MemoryReader {
    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        check_range(offset, len, self.len())?;
        let start = offset as usize;
        Ok(self.data[start..start + len as usize].to_vec())
    }
}

/// Reader for dictzip files: gzip with an `RA` chunk table.
pub struct DictZipReader {
    state: Mutex<DictZipState>,
    chunk_len: u64,
    chunk_sizes: Vec<u64>,
    /// File offset of each compressed chunk.
    chunk_offsets: Vec<u64>,
    len: u64,
}

struct DictZipState {
    file: File,
    /// Most recently inflated chunk, reused by consecutive reads.
    cached: Option<(usize, Vec<u8>)>,
}

impl DictZipReader {
    /// Parses the gzip header. Returns `None` when the file has no usable
    /// random access table.
    pub fn new(mut file: File) -> Result<Option<Self>> {
        let mut fixed = [0u8; 10];
        file.read_exact(&mut fixed)
            .map_err(|e| DslError::Container(format!("truncated gzip header: {e}")))?;
        if fixed[..2] != GZIP_MAGIC || fixed[2] != 8 {
            return Err(DslError::Container("not a deflate gzip file".to_string()));
        }
        let flags = fixed[3];
        if flags & FLAG_EXTRA == 0 {
            return Ok(None);
        }

        let extra_len = read_u16(&mut file)? as usize;
        let mut extra = vec![0u8; extra_len];
        file.read_exact(&mut extra)?;
        let Some((chunk_len, chunk_sizes)) = parse_ra_field(&extra) else {
            return Ok(None);
        };

        if flags & FLAG_NAME != 0 {
            skip_zero_terminated(&mut file)?;
        }
        if flags & FLAG_COMMENT != 0 {
            skip_zero_terminated(&mut file)?;
        }
        if flags & FLAG_HCRC != 0 {
            read_u16(&mut file)?;
        }

        let mut offset = file.stream_position()?;
        let mut chunk_offsets = Vec::with_capacity(chunk_sizes.len());
        for size in &chunk_sizes {
            chunk_offsets.push(offset);
            offset += size;
        }

        // The gzip trailer ends with the uncompressed length modulo 2^32.
        file.seek(SeekFrom::End(-4))?;
        let mut trailer = [0u8; 4];
        file.read_exact(&mut trailer)?;
        let len = u64::from(u32::from_le_bytes(trailer));

        Ok(Some(Self {
            state: Mutex::new(DictZipState { file, cached: None }),
            chunk_len,
            chunk_sizes,
            chunk_offsets,
            len,
        }))
    }

    fn inflate_chunk(&self, state: &mut DictZipState, index: usize) -> Result<Vec<u8>> {
        let size = self.chunk_sizes[index];
        let mut compressed = vec![0u8; size as usize];
        state.file.seek(SeekFrom::Start(self.chunk_offsets[index]))?;
        state.file.read_exact(&mut compressed)?;

        let mut output = Vec::with_capacity(self.chunk_len as usize);
        Decompress::new(false)
            .decompress_vec(&compressed, &mut output, FlushDecompress::Sync)
            .map_err(|e| DslError::Container(format!("chunk {index} is corrupt: {e}")))?;
        Ok(output)
    }
}

impl ByteRangeReader for DictZipReader {
    fn len(&self) -> u64 {
        self.len
    }

    fn read_range(&self, offset: u64, len: u64) -> Result<Vec<u8>> {
        check_range(offset, len, self.len)?;
        let mut result = Vec::with_capacity(len as usize);
        if len == 0 {
            return Ok(result);
        }

        let mut state = self.state.lock().map_err(|_| DslError::LockPoisoned)?;
        let first = (offset / self.chunk_len) as usize;
        let last = ((offset + len - 1) / self.chunk_len) as usize;
        if last >= self.chunk_sizes.len() {
            return Err(DslError::Container(format!(
                "offset {offset:#x} is past the last dictzip chunk"
            )));
        }

        for index in first..=last {
            let chunk = match state.cached.take() {
                Some((cached_index, data)) if cached_index == index => data,
                _ => self.inflate_chunk(&mut state, index)?,
            };

            let chunk_start = index as u64 * self.chunk_len;
            let from = offset.saturating_sub(chunk_start) as usize;
            let to = ((offset + len - chunk_start) as usize).min(chunk.len());
            if from > to {
                return Err(DslError::Container(format!(
                    "chunk {index} is shorter than expected"
                )));
            }
            result.extend_from_slice(&chunk[from..to]);
            state.cached = Some((index, chunk));
        }

        if result.len() as u64 != len {
            return Err(DslError::Container(format!(
                "read {} bytes at {offset:#x}, expected {len}",
                result.len()
            )));
        }
        Ok(result)
    }
}

/// Finds the `RA` subfield in a gzip extra field and returns the chunk
/// length and the compressed size of every chunk.
fn parse_ra_field(extra: &[u8]) -> Option<(u64, Vec<u64>)> {
    let mut rest = extra;
    while rest.len() >= 4 {
        let id = [rest[0], rest[1]];
        let size = u16::from_le_bytes([rest[2], rest[3]]) as usize;
        let data = rest.get(4..4 + size)?;
        if id == *b"RA" {
            let word = |i: usize| -> Option<u64> {
                let bytes = data.get(i * 2..i * 2 + 2)?;
                Some(u64::from(u16::from_le_bytes([bytes[0], bytes[1]])))
            };
            let chunk_len = word(1)?;
            let count = word(2)? as usize;
            if chunk_len == 0 {
                return None;
            }
            let sizes = (0..count).map(|i| word(3 + i)).collect::<Option<Vec<_>>>()?;
            return Some((chunk_len, sizes));
        }
        rest = &rest[4 + size..];
    }
    None
}

fn read_u16(file: &mut File) -> Result<u16> {
    let mut bytes = [0u8; 2];
    file.read_exact(&mut bytes)?;
    Ok(u16::from_le_bytes(bytes))
}

fn skip_zero_terminated(file: &mut File) -> Result<()> {
    let mut byte = [0u8; 1];
    loop {
        file.read_exact(&mut byte)?;
        if byte[0] == 0 {
            return Ok(());
        }
    }
}
