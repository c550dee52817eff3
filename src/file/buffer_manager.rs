use std::collections::HashMap;

use super::error::{FileError, FileResult};
use super::file_manager::{FileHandle, PagedFileManager};
use super::{PageId, BUFFER_POOL_SIZE, PAGE_SIZE};

/// A key identifying a page in the buffer pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct BufferKey {
    file: FileHandle,
    page_no: PageId,
}

/// Per-frame metadata
#[derive(Debug, Clone)]
struct FrameDesc {
    /// Owning file, None while the frame is invalid
    file: Option<FileHandle>,
    page_no: PageId,
    /// Number of outstanding pins; a pinned frame is never evicted
    pin_count: u32,
    /// Modified since last write-back
    dirty: bool,
    /// Touched since the clock hand last swept past
    ref_bit: bool,
    valid: bool,
}

impl FrameDesc {
    fn new() -> Self {
        Self {
            file: None,
            page_no: 0,
            pin_count: 0,
            dirty: false,
            ref_bit: false,
            valid: false,
        }
    }

    /// Bind the frame to a freshly faulted-in page, pinned once
    fn set(&mut self, file: FileHandle, page_no: PageId) {
        self.file = Some(file);
        self.page_no = page_no;
        self.pin_count = 1;
        self.dirty = false;
        self.ref_bit = false;
        self.valid = true;
    }

    fn clear(&mut self) {
        *self = FrameDesc::new();
    }
}

/// Fixed pool of page frames with clock replacement and a pinning
/// discipline. Every `read_page`/`alloc_page` pins the frame; the caller
/// must pair it with exactly one `unpin_page`.
pub struct BufferManager {
    /// Underlying file manager
    file_manager: PagedFileManager,
    /// Frame descriptor table, parallel to `pool`
    frames: Vec<FrameDesc>,
    /// Page-sized buffers, one per frame
    pool: Vec<Vec<u8>>,
    /// (file, page_no) -> frame index for every valid frame
    page_table: HashMap<BufferKey, usize>,
    /// Clock hand, persisted across allocations
    clock_hand: usize,
}

impl BufferManager {
    /// Create a new buffer manager
    pub fn new(file_manager: PagedFileManager) -> Self {
        Self::with_capacity(file_manager, BUFFER_POOL_SIZE)
    }

    /// Create a new buffer manager with the specified number of frames
    pub fn with_capacity(file_manager: PagedFileManager, capacity: usize) -> Self {
        assert!(capacity > 0, "buffer pool requires at least one frame");
        Self {
            file_manager,
            frames: vec![FrameDesc::new(); capacity],
            pool: (0..capacity).map(|_| vec![0u8; PAGE_SIZE]).collect(),
            page_table: HashMap::with_capacity(capacity * 12 / 10 + 1),
            // first advance lands on frame 0
            clock_hand: capacity - 1,
        }
    }

    /// Get a reference to the file manager
    pub fn file_manager(&self) -> &PagedFileManager {
        &self.file_manager
    }

    /// Get a mutable reference to the file manager
    pub fn file_manager_mut(&mut self) -> &mut PagedFileManager {
        &mut self.file_manager
    }

    /// Read a page into the pool (or find it there) and pin its frame.
    /// The returned bytes stay resident until the matching `unpin_page`.
    pub fn read_page(&mut self, file: FileHandle, page_no: PageId) -> FileResult<&mut [u8]> {
        let key = BufferKey { file, page_no };

        if let Some(&frame_no) = self.page_table.get(&key) {
            let desc = &mut self.frames[frame_no];
            desc.ref_bit = true;
            desc.pin_count += 1;
            return Ok(self.pool[frame_no].as_mut_slice());
        }

        let frame_no = self.alloc_buf()?;
        // Fault in before touching the page table: a failed read must
        // leave the frame invalid and unmapped.
        self.file_manager
            .read_page(file, page_no, &mut self.pool[frame_no])?;
        self.page_table.insert(key, frame_no);
        self.frames[frame_no].set(file, page_no);
        Ok(self.pool[frame_no].as_mut_slice())
    }

    /// Drop one pin from a page, optionally marking it dirty.
    /// The dirty hint is additive; `dirty = false` never clears the bit.
    pub fn unpin_page(&mut self, file: FileHandle, page_no: PageId, dirty: bool) -> FileResult<()> {
        let key = BufferKey { file, page_no };
        let frame_no = *self
            .page_table
            .get(&key)
            .ok_or(FileError::PageNotCached(page_no))?;

        let desc = &mut self.frames[frame_no];
        if desc.pin_count == 0 {
            return Err(FileError::PageNotPinned(page_no));
        }
        desc.pin_count -= 1;
        if dirty {
            desc.dirty = true;
        }
        Ok(())
    }

    /// Allocate a new page in the file and pin a zeroed frame for it.
    /// Page-format initialization is up to the caller.
    pub fn alloc_page(&mut self, file: FileHandle) -> FileResult<(PageId, &mut [u8])> {
        let page_no = self.file_manager.allocate_page(file)?;
        let frame_no = self.alloc_buf()?;
        self.pool[frame_no].fill(0);
        self.page_table
            .insert(BufferKey { file, page_no }, frame_no);
        self.frames[frame_no].set(file, page_no);
        Ok((page_no, self.pool[frame_no].as_mut_slice()))
    }

    /// Drop a page from the pool without write-back and free it in the file
    pub fn dispose_page(&mut self, file: FileHandle, page_no: PageId) -> FileResult<()> {
        let key = BufferKey { file, page_no };
        if let Some(frame_no) = self.page_table.remove(&key) {
            self.frames[frame_no].clear();
        }
        self.file_manager.dispose_page(file, page_no)
    }

    /// Write back every dirty page of `file` and evict all its frames.
    /// Fails with `PagePinned` if any page of the file is still pinned.
    pub fn flush_file(&mut self, file: FileHandle) -> FileResult<()> {
        for frame_no in 0..self.frames.len() {
            let (valid, owner, page_no, pin_count, dirty) = {
                let d = &self.frames[frame_no];
                (d.valid, d.file, d.page_no, d.pin_count, d.dirty)
            };

            if owner != Some(file) {
                continue;
            }
            if !valid {
                return Err(FileError::BadBuffer(frame_no));
            }
            if pin_count > 0 {
                return Err(FileError::PagePinned(page_no));
            }
            if dirty {
                self.file_manager
                    .write_page(file, page_no, &self.pool[frame_no])?;
            }
            self.page_table.remove(&BufferKey { file, page_no });
            self.frames[frame_no].clear();
        }
        Ok(())
    }

    /// Borrow an already-resident page without changing its pin count.
    /// The caller is expected to hold a pin on it.
    pub fn page(&self, file: FileHandle, page_no: PageId) -> FileResult<&[u8]> {
        let key = BufferKey { file, page_no };
        let frame_no = *self
            .page_table
            .get(&key)
            .ok_or(FileError::PageNotCached(page_no))?;
        Ok(self.pool[frame_no].as_slice())
    }

    /// Mutable variant of [`page`](Self::page)
    pub fn page_mut(&mut self, file: FileHandle, page_no: PageId) -> FileResult<&mut [u8]> {
        let key = BufferKey { file, page_no };
        let frame_no = *self
            .page_table
            .get(&key)
            .ok_or(FileError::PageNotCached(page_no))?;
        Ok(self.pool[frame_no].as_mut_slice())
    }

    /// Find a victim frame with the clock algorithm: one step per
    /// inspection, clearing reference bits as the hand sweeps, skipping
    /// pinned frames, writing back a dirty victim before reuse. Two full
    /// revolutions without a victim means every frame is pinned.
    fn alloc_buf(&mut self) -> FileResult<usize> {
        let num_frames = self.frames.len();
        let mut inspected = 0usize;

        loop {
            inspected += 1;
            if inspected > 2 * num_frames {
                return Err(FileError::BufferExceeded);
            }
            self.clock_hand = (self.clock_hand + 1) % num_frames;
            let frame_no = self.clock_hand;

            if !self.frames[frame_no].valid {
                return Ok(frame_no);
            }
            if self.frames[frame_no].ref_bit {
                self.frames[frame_no].ref_bit = false;
                continue;
            }
            if self.frames[frame_no].pin_count > 0 {
                continue;
            }

            let Some(file) = self.frames[frame_no].file else {
                return Err(FileError::BadBuffer(frame_no));
            };
            let page_no = self.frames[frame_no].page_no;
            if self.frames[frame_no].dirty {
                // Write back exactly the victim page, not the whole file
                self.file_manager
                    .write_page(file, page_no, &self.pool[frame_no])?;
            }
            self.page_table.remove(&BufferKey { file, page_no });
            self.frames[frame_no].clear();
            return Ok(frame_no);
        }
    }

    /// Number of pages currently resident in the pool
    pub fn cached_page_count(&self) -> usize {
        self.page_table.len()
    }

    /// Check whether a page is resident in the pool
    pub fn is_page_cached(&self, file: FileHandle, page_no: PageId) -> bool {
        self.page_table.contains_key(&BufferKey { file, page_no })
    }

    /// Pin count of a resident page, None if not resident
    pub fn pin_count_of(&self, file: FileHandle, page_no: PageId) -> Option<u32> {
        self.page_table
            .get(&BufferKey { file, page_no })
            .map(|&f| self.frames[f].pin_count)
    }

    /// Dirty bit of a resident page, None if not resident
    pub fn is_dirty(&self, file: FileHandle, page_no: PageId) -> Option<bool> {
        self.page_table
            .get(&BufferKey { file, page_no })
            .map(|&f| self.frames[f].dirty)
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        // Best-effort write-back of dirty frames; leaked pins do not abort
        for frame_no in 0..self.frames.len() {
            let d = &self.frames[frame_no];
            if d.valid && d.dirty {
                if let Some(file) = d.file {
                    if let Err(err) =
                        self.file_manager
                            .write_page(file, d.page_no, &self.pool[frame_no])
                    {
                        log::error!(
                            "shutdown write-back of page {} failed: {}",
                            d.page_no,
                            err
                        );
                    }
                }
            }
        }
        if let Err(err) = self.file_manager.sync_all() {
            log::warn!("shutdown sync failed: {}", err);
        }
    }
}
