use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("File already exists: {0}")]
    FileExists(String),

    #[error("File has no pages: {0}")]
    EmptyFile(String),

    #[error("Invalid file handle: {0}")]
    InvalidHandle(usize),

    #[error("File handle limit reached")]
    TooManyOpenFiles,

    #[error("Invalid page size: expected {expected}, got {actual}")]
    InvalidPageSize { expected: usize, actual: usize },

    #[error("No unpinned frame available for eviction")]
    BufferExceeded,

    #[error("Page is pinned: page_no={0}")]
    PagePinned(u32),

    #[error("Page is not pinned: page_no={0}")]
    PageNotPinned(u32),

    #[error("Page not in buffer pool: page_no={0}")]
    PageNotCached(u32),

    #[error("Invalid frame still references a file: frame={0}")]
    BadBuffer(usize),
}

pub type FileResult<T> = Result<T, FileError>;
