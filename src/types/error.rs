use std::path::PathBuf;

use thiserror::Error;

use crate::types::{PageRank, TupleIndex};

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Tuple file not found: {}", path.display())]
    SourceNotFound { path: PathBuf },

    #[error("Tuple index {index} out of range (must be below {current})")]
    IndexOutOfRange { index: TupleIndex, current: TupleIndex },

    #[error("Reader is closed")]
    Closed,

    #[error("Corrupted page: page={page}, reason={reason}")]
    CorruptedPage { page: PageRank, reason: String },

    #[error("Inconsistent page offsets at page {page}: {reason}")]
    InconsistentOffsets { page: PageRank, reason: String },
}

pub type Result<T> = std::result::Result<T, ReaderError>;
