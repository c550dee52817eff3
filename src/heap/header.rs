use super::error::{HeapError, HeapResult};
use crate::file::PageId;

/// Longest file name the header stores; longer names are truncated
pub const MAX_NAME_LEN: usize = 64;

const NAME_OFF: usize = 2;
const FIRST_PAGE_OFF: usize = NAME_OFF + MAX_NAME_LEN;
const LAST_PAGE_OFF: usize = FIRST_PAGE_OFF + 4;
const REC_CNT_OFF: usize = LAST_PAGE_OFF + 4;
const PAGE_CNT_OFF: usize = REC_CNT_OFF + 4;
const HEADER_LEN: usize = PAGE_CNT_OFF + 4;

/// Heap file metadata, stored on the file's first page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHeader {
    pub file_name: String,
    /// First data page of the chain
    pub first_page: PageId,
    /// Last data page of the chain, where inserts go
    pub last_page: PageId,
    /// Records in the whole file
    pub rec_cnt: u32,
    /// Data pages, excluding this header page
    pub page_cnt: u32,
}

impl FileHeader {
    pub fn new(file_name: &str, first_page: PageId) -> Self {
        Self {
            file_name: file_name.to_string(),
            first_page,
            last_page: first_page,
            rec_cnt: 0,
            page_cnt: 1,
        }
    }

    /// Encode into the header page's buffer
    pub fn write_to(&self, buf: &mut [u8]) {
        let name = self.file_name.as_bytes();
        let name_len = name.len().min(MAX_NAME_LEN);
        buf[0..2].copy_from_slice(&(name_len as u16).to_le_bytes());
        buf[NAME_OFF..NAME_OFF + MAX_NAME_LEN].fill(0);
        buf[NAME_OFF..NAME_OFF + name_len].copy_from_slice(&name[..name_len]);
        buf[FIRST_PAGE_OFF..FIRST_PAGE_OFF + 4].copy_from_slice(&self.first_page.to_le_bytes());
        buf[LAST_PAGE_OFF..LAST_PAGE_OFF + 4].copy_from_slice(&self.last_page.to_le_bytes());
        buf[REC_CNT_OFF..REC_CNT_OFF + 4].copy_from_slice(&self.rec_cnt.to_le_bytes());
        buf[PAGE_CNT_OFF..PAGE_CNT_OFF + 4].copy_from_slice(&self.page_cnt.to_le_bytes());
    }

    /// Decode from the header page's buffer
    pub fn read_from(buf: &[u8]) -> HeapResult<Self> {
        if buf.len() < HEADER_LEN {
            return Err(HeapError::Corrupt(format!(
                "not enough data for file header: {} bytes",
                buf.len()
            )));
        }

        let name_len = u16::from_le_bytes([buf[0], buf[1]]) as usize;
        if name_len > MAX_NAME_LEN {
            return Err(HeapError::Corrupt(format!(
                "file header name length {} out of range",
                name_len
            )));
        }
        let file_name = String::from_utf8_lossy(&buf[NAME_OFF..NAME_OFF + name_len]).into_owned();

        let word = |off: usize| u32::from_le_bytes([buf[off], buf[off + 1], buf[off + 2], buf[off + 3]]);
        Ok(Self {
            file_name,
            first_page: word(FIRST_PAGE_OFF),
            last_page: word(LAST_PAGE_OFF),
            rec_cnt: word(REC_CNT_OFF),
            page_cnt: word(PAGE_CNT_OFF),
        })
    }
}
