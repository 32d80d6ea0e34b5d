//! Reading DSL sources: containers, encodings and the line scanner.

pub mod container;
pub mod encoding;
pub mod scanner;

pub use container::{ByteRangeReader, DictZipReader, MemoryReader, PlainFileReader, open_container};
pub use encoding::DslEncoding;
pub use scanner::{Line, LineScanner, SourceHeader, is_dsl_blank, strip_comments};
