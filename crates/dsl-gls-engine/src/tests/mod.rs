use flate2::{Compress, Compression, Crc, FlushCompress};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Create a temporary directory for dictionary files
pub fn create_test_dir() -> TempDir {
    tempfile::tempdir().unwrap()
}

/// Create a test file with content
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> PathBuf {
    let file_path = dir.join(filename);
    fs::write(&file_path, content).unwrap();
    file_path
}

/// Write `data` as a dictzip file: a gzip member whose deflate stream is
/// fully flushed every `chunk_len` bytes, with the chunk table in an `RA`
/// extra field.
pub fn write_dictzip(path: &Path, data: &[u8], chunk_len: usize) {
    let mut compress = Compress::new(Compression::default(), false);
    let chunks: Vec<&[u8]> = data.chunks(chunk_len).collect();
    let mut body = Vec::new();
    let mut sizes = Vec::new();

    for (i, chunk) in chunks.iter().enumerate() {
        let flush = if i + 1 == chunks.len() {
            FlushCompress::Finish
        } else {
            FlushCompress::Full
        };
        let start = body.len();
        body.reserve(chunk.len() * 2 + 64);
        let consumed_before = compress.total_in();
        compress.compress_vec(chunk, &mut body, flush).unwrap();
        assert_eq!(compress.total_in() - consumed_before, chunk.len() as u64);
        sizes.push(u16::try_from(body.len() - start).unwrap());
    }

    let mut ra = Vec::new();
    for word in [1, u16::try_from(chunk_len).unwrap(), sizes.len() as u16]
        .into_iter()
        .chain(sizes)
    {
        ra.extend_from_slice(&word.to_le_bytes());
    }

    let mut out = vec![0x1f, 0x8b, 8, 0x04, 0, 0, 0, 0, 0, 0xff];
    out.extend_from_slice(&(ra.len() as u16 + 4).to_le_bytes());
    out.extend_from_slice(b"RA");
    out.extend_from_slice(&(ra.len() as u16).to_le_bytes());
    out.extend_from_slice(&ra);
    out.extend_from_slice(&body);

    let mut crc = Crc::new();
    crc.update(data);
    out.extend_from_slice(&crc.sum().to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());
    fs::write(path, out).unwrap();
}
