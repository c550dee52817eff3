use crate::file::{FileError, PageId};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeapError {
    #[error("File error: {0}")]
    File(#[from] FileError),

    #[error("Corrupt page: {0}")]
    Corrupt(String),

    #[error("Invalid slot: page_no={page_no}, slot_no={slot_no}")]
    InvalidSlot { page_no: PageId, slot_no: u16 },

    #[error("No space left on page {0}")]
    NoSpace(PageId),

    #[error("Bad scan parameter: {0}")]
    BadScanParam(String),

    #[error("Record length {len} exceeds maximum {max}")]
    InvalidRecordLength { len: usize, max: usize },

    #[error("Scan is not positioned on a record")]
    NoCurrentRecord,
}

pub type HeapResult<T> = Result<T, HeapError>;
