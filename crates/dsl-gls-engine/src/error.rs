use std::path::PathBuf;

/// Fatal errors of the indexing and lookup pipeline.
///
/// Structural problems in the source text are never errors: they are logged
/// as warnings and scanning carries on.
#[derive(Debug, thiserror::Error)]
pub enum DslError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    NotFound(PathBuf),

    /// A line cannot be decoded with the dictionary's encoding.
    #[error("cannot decode line {line} at offset {offset:#x} as {encoding}")]
    Decode {
        line: usize,
        offset: u64,
        encoding: &'static str,
    },

    /// The container could not be opened or a byte range could not be read.
    #[error("container error: {0}")]
    Container(String),

    /// Indexing aborted; carries the line the scanner had reached.
    #[error("DSL dictionary reading failed at line {line}: {source}")]
    Indexing {
        line: usize,
        #[source]
        source: Box<DslError>,
    },

    #[error("a container lock was poisoned by a panicking reader")]
    LockPoisoned,

    /// The byte range of a card does not hold a usable article.
    #[error("invalid article at offset {offset:#x}: {reason}")]
    InvalidArticle { offset: u64, reason: String },
}

pub type Result<T> = std::result::Result<T, DslError>;

impl DslError {
    pub(crate) fn at_line(self, line: usize) -> Self {
        match self {
            DslError::Indexing { .. } => self,
            other => DslError::Indexing {
                line,
                source: Box::new(other),
            },
        }
    }
}
