pub mod catalog;
pub mod file;
pub mod heap;
pub mod query;

pub use file::{BufferManager, FileHandle, PagedFileManager, BUFFER_POOL_SIZE, PAGE_SIZE};
pub use heap::{AttrType, CompOp, Record, RecordId};
