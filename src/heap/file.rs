use std::path::Path;

use log::error;

use super::error::HeapResult;
use super::header::FileHeader;
use super::page::DataPage;
use super::{Record, RecordId};
use crate::file::{BufferManager, FileHandle, PageId};

/// Create a heap file: a header page followed by one empty data page.
/// Fails with `FileExists` when the file is already there.
pub fn create_heap_file<P: AsRef<Path>>(buffer_mgr: &mut BufferManager, path: P) -> HeapResult<()> {
    let path = path.as_ref();
    buffer_mgr.file_manager_mut().create_file(path)?;
    let file = buffer_mgr.file_manager_mut().open_file(path)?;

    let (hdr_page_no, _) = buffer_mgr.alloc_page(file)?;
    let (data_page_no, data_buf) = buffer_mgr.alloc_page(file)?;
    DataPage::init(data_buf, data_page_no)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let header = FileHeader::new(&name, data_page_no);
    header.write_to(buffer_mgr.page_mut(file, hdr_page_no)?);

    buffer_mgr.unpin_page(file, hdr_page_no, true)?;
    buffer_mgr.unpin_page(file, data_page_no, true)?;
    buffer_mgr.flush_file(file)?;
    buffer_mgr.file_manager_mut().close_file(file)?;
    Ok(())
}

/// Remove a heap file from disk. The file must be closed.
pub fn destroy_heap_file<P: AsRef<Path>>(
    buffer_mgr: &mut BufferManager,
    path: P,
) -> HeapResult<()> {
    buffer_mgr.file_manager_mut().remove_file(path)?;
    Ok(())
}

/// Open handle on a heap file.
///
/// The header page stays pinned for the handle's whole lifetime; at most
/// one data page (the cursor) is pinned at any time. Header metadata is
/// cached here and written back into the pinned header frame at close.
pub struct HeapFile {
    pub(crate) file: FileHandle,
    pub(crate) hdr_page_no: PageId,
    pub(crate) hdr: FileHeader,
    pub(crate) hdr_dirty: bool,
    pub(crate) cur_page_no: Option<PageId>,
    pub(crate) cur_dirty: bool,
    pub(crate) cur_rid: Option<RecordId>,
}

impl HeapFile {
    /// Open an existing heap file, pinning its header and first data page
    pub fn open<P: AsRef<Path>>(buffer_mgr: &mut BufferManager, path: P) -> HeapResult<Self> {
        let file = buffer_mgr.file_manager_mut().open_file(path)?;
        let hdr_page_no = buffer_mgr.file_manager_mut().get_first_page(file)?;

        let hdr_buf = buffer_mgr.read_page(file, hdr_page_no)?;
        let hdr = match FileHeader::read_from(hdr_buf) {
            Ok(hdr) => hdr,
            Err(err) => {
                let _ = buffer_mgr.unpin_page(file, hdr_page_no, false);
                return Err(err);
            }
        };

        let first_page = hdr.first_page;
        if let Err(err) = buffer_mgr.read_page(file, first_page) {
            let _ = buffer_mgr.unpin_page(file, hdr_page_no, false);
            return Err(err.into());
        }

        Ok(Self {
            file,
            hdr_page_no,
            hdr,
            hdr_dirty: false,
            cur_page_no: Some(first_page),
            cur_dirty: false,
            cur_rid: None,
        })
    }

    /// Number of records in the file
    pub fn rec_cnt(&self) -> u32 {
        self.hdr.rec_cnt
    }

    /// Number of data pages in the file
    pub fn page_cnt(&self) -> u32 {
        self.hdr.page_cnt
    }

    pub fn first_page(&self) -> PageId {
        self.hdr.first_page
    }

    pub fn last_page(&self) -> PageId {
        self.hdr.last_page
    }

    pub fn file_name(&self) -> &str {
        &self.hdr.file_name
    }

    /// Fetch a record by identifier, moving the cursor to its page
    pub fn get_record(
        &mut self,
        buffer_mgr: &mut BufferManager,
        rid: RecordId,
    ) -> HeapResult<Record> {
        self.make_current(buffer_mgr, rid.page_no)?;

        let page = DataPage::from_buffer(buffer_mgr.page_mut(self.file, rid.page_no)?)?;
        let data = page.get_record(rid)?.to_vec();
        self.cur_rid = Some(rid);
        Ok(Record::new(data))
    }

    /// Make `page_no` the pinned cursor page, releasing the previous one
    /// (carrying its dirty flag) when it differs
    pub(crate) fn make_current(
        &mut self,
        buffer_mgr: &mut BufferManager,
        page_no: PageId,
    ) -> HeapResult<()> {
        if self.cur_page_no == Some(page_no) {
            return Ok(());
        }

        if let Some(cur) = self.cur_page_no.take() {
            let dirty = self.cur_dirty;
            self.cur_dirty = false;
            buffer_mgr.unpin_page(self.file, cur, dirty)?;
        }

        buffer_mgr.read_page(self.file, page_no)?;
        self.cur_page_no = Some(page_no);
        self.cur_dirty = false;
        Ok(())
    }

    /// Release the cursor and header pins, write back header metadata,
    /// flush and close the file. Failures along the way are logged and do
    /// not stop the close.
    pub fn close(mut self, buffer_mgr: &mut BufferManager) {
        if let Some(cur) = self.cur_page_no.take() {
            if let Err(err) = buffer_mgr.unpin_page(self.file, cur, self.cur_dirty) {
                error!("unpin of data page {} failed on close: {}", cur, err);
            }
            self.cur_dirty = false;
        }

        if self.hdr_dirty {
            match buffer_mgr.page_mut(self.file, self.hdr_page_no) {
                Ok(buf) => self.hdr.write_to(buf),
                Err(err) => error!(
                    "header write-back of {} failed on close: {}",
                    self.hdr.file_name, err
                ),
            }
        }
        if let Err(err) = buffer_mgr.unpin_page(self.file, self.hdr_page_no, self.hdr_dirty) {
            error!("unpin of header page failed on close: {}", err);
        }

        if let Err(err) = buffer_mgr.flush_file(self.file) {
            error!("flush of {} failed on close: {}", self.hdr.file_name, err);
        }
        if let Err(err) = buffer_mgr.file_manager_mut().close_file(self.file) {
            error!("close of {} failed: {}", self.hdr.file_name, err);
        }
    }
}
