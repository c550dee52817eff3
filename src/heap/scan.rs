use std::cmp::Ordering;

use log::error;
use serde::{Deserialize, Serialize};

use super::error::{HeapError, HeapResult};
use super::file::HeapFile;
use super::page::{DataPage, MAX_RECORD_SIZE};
use super::{Record, RecordId};
use crate::file::{BufferManager, PageId};

/// Attribute types a scan predicate can compare.
/// `Int` and `Float` are 4 bytes, little-endian (`i32` / `f32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttrType {
    Int,
    Float,
    Str,
}

/// Comparison operators for scan predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompOp {
    Lt,
    Lte,
    Eq,
    Gte,
    Gt,
    Ne,
}

impl CompOp {
    fn matches(self, ord: Ordering) -> bool {
        match self {
            CompOp::Lt => ord == Ordering::Less,
            CompOp::Lte => ord != Ordering::Greater,
            CompOp::Eq => ord == Ordering::Equal,
            CompOp::Gte => ord != Ordering::Less,
            CompOp::Gt => ord == Ordering::Greater,
            CompOp::Ne => ord != Ordering::Equal,
        }
    }
}

/// A fixed-field predicate: compare `length` bytes at `offset` of each
/// record against `value` under `op`
#[derive(Debug, Clone)]
pub struct ScanFilter {
    pub offset: usize,
    pub length: usize,
    pub attr_type: AttrType,
    pub value: Vec<u8>,
    pub op: CompOp,
}

/// Forward iterator over a heap file's records with optional filtering.
/// Composes around a `HeapFile` handle and drives its cursor.
pub struct HeapFileScan {
    heap: HeapFile,
    filter: Option<ScanFilter>,
    marked_page_no: Option<PageId>,
    marked_rid: Option<RecordId>,
}

impl HeapFileScan {
    pub fn open<P: AsRef<std::path::Path>>(
        buffer_mgr: &mut BufferManager,
        path: P,
    ) -> HeapResult<Self> {
        Ok(Self {
            heap: HeapFile::open(buffer_mgr, path)?,
            filter: None,
            marked_page_no: None,
            marked_rid: None,
        })
    }

    /// Configure the scan's predicate. Passing no value disables
    /// filtering entirely, which is how a match-all scan is started.
    pub fn start_scan(
        &mut self,
        offset: usize,
        length: usize,
        attr_type: AttrType,
        value: Option<&[u8]>,
        op: CompOp,
    ) -> HeapResult<()> {
        let Some(value) = value else {
            self.filter = None;
            return Ok(());
        };

        if length < 1 {
            return Err(HeapError::BadScanParam(format!(
                "filter length must be at least 1, got {}",
                length
            )));
        }
        if matches!(attr_type, AttrType::Int | AttrType::Float) {
            if length != 4 {
                return Err(HeapError::BadScanParam(format!(
                    "numeric filters are 4 bytes, got {}",
                    length
                )));
            }
            if value.len() < 4 {
                return Err(HeapError::BadScanParam(format!(
                    "numeric filter value too short: {} bytes",
                    value.len()
                )));
            }
        }

        self.filter = Some(ScanFilter {
            offset,
            length,
            attr_type,
            value: value.to_vec(),
            op,
        });
        Ok(())
    }

    /// Advance to the next record satisfying the filter.
    /// `Ok(None)` signals the end of the file.
    pub fn scan_next(&mut self, buffer_mgr: &mut BufferManager) -> HeapResult<Option<RecordId>> {
        loop {
            let Some(rid) = self.advance(buffer_mgr)? else {
                return Ok(None);
            };
            self.heap.cur_rid = Some(rid);

            let matched = {
                let page = DataPage::from_buffer(buffer_mgr.page_mut(self.heap.file, rid.page_no)?)?;
                let rec = page.get_record(rid)?;
                self.matches(rec)
            };
            if matched {
                return Ok(Some(rid));
            }
        }
    }

    /// Move the cursor to the next record in chain order, pinning pages
    /// along the way. Returns None at the end of the chain.
    fn advance(&mut self, buffer_mgr: &mut BufferManager) -> HeapResult<Option<RecordId>> {
        let file = self.heap.file;

        // First call of a scan: position on the first page
        let Some(mut cur_no) = self.heap.cur_page_no else {
            let first = self.heap.hdr.first_page;
            buffer_mgr.read_page(file, first)?;
            self.heap.cur_page_no = Some(first);
            self.heap.cur_dirty = false;

            let rec = DataPage::from_buffer(buffer_mgr.page_mut(file, first)?)?.first_record();
            if rec.is_none() {
                // an empty first page ends the scan immediately
                buffer_mgr.unpin_page(file, first, false)?;
                self.heap.cur_page_no = None;
            }
            return Ok(rec);
        };

        let mut next = {
            let page = DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?;
            match self.heap.cur_rid {
                Some(cur) if cur.page_no == cur_no => page.next_record(cur),
                _ => page.first_record(),
            }
        };

        // Exhausted the current page: follow the chain until a record
        // turns up or the chain ends
        while next.is_none() {
            let link = DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?.next_page();
            let Some(next_no) = link else {
                // the cursor page stays pinned; end_scan releases it
                return Ok(None);
            };

            let dirty = self.heap.cur_dirty;
            self.heap.cur_page_no = None;
            self.heap.cur_dirty = false;
            buffer_mgr.unpin_page(file, cur_no, dirty)?;

            buffer_mgr.read_page(file, next_no)?;
            self.heap.cur_page_no = Some(next_no);
            cur_no = next_no;
            next = DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?.first_record();
        }
        Ok(next)
    }

    fn matches(&self, rec: &[u8]) -> bool {
        let Some(filter) = &self.filter else {
            return true;
        };
        if filter.offset + filter.length > rec.len() {
            return false;
        }

        let ord = match filter.attr_type {
            AttrType::Int => {
                // byte-wise copies into aligned locals
                let mut attr = [0u8; 4];
                attr.copy_from_slice(&rec[filter.offset..filter.offset + 4]);
                let mut probe = [0u8; 4];
                probe.copy_from_slice(&filter.value[..4]);
                i32::from_le_bytes(attr).cmp(&i32::from_le_bytes(probe))
            }
            AttrType::Float => {
                let mut attr = [0u8; 4];
                attr.copy_from_slice(&rec[filter.offset..filter.offset + 4]);
                let mut probe = [0u8; 4];
                probe.copy_from_slice(&filter.value[..4]);
                match f32::from_le_bytes(attr).partial_cmp(&f32::from_le_bytes(probe)) {
                    Some(ord) => ord,
                    None => return false,
                }
            }
            AttrType::Str => compare_bounded(
                &rec[filter.offset..filter.offset + filter.length],
                &filter.value,
                filter.length,
            ),
        };
        filter.op.matches(ord)
    }

    /// Copy of the record the cursor is on
    pub fn get_record(&self, buffer_mgr: &mut BufferManager) -> HeapResult<Record> {
        let Some(rid) = self.heap.cur_rid else {
            return Err(HeapError::NoCurrentRecord);
        };
        let page = DataPage::from_buffer(buffer_mgr.page_mut(self.heap.file, rid.page_no)?)?;
        Ok(Record::new(page.get_record(rid)?.to_vec()))
    }

    /// Delete the record the cursor is on
    pub fn delete_record(&mut self, buffer_mgr: &mut BufferManager) -> HeapResult<()> {
        let Some(rid) = self.heap.cur_rid else {
            return Err(HeapError::NoCurrentRecord);
        };
        let mut page = DataPage::from_buffer(buffer_mgr.page_mut(self.heap.file, rid.page_no)?)?;
        page.delete_record(rid)?;

        self.heap.cur_dirty = true;
        self.heap.hdr.rec_cnt = self.heap.hdr.rec_cnt.saturating_sub(1);
        self.heap.hdr_dirty = true;
        Ok(())
    }

    /// Snapshot the cursor position
    pub fn mark(&mut self) {
        self.marked_page_no = self.heap.cur_page_no;
        self.marked_rid = self.heap.cur_rid;
    }

    /// Return the cursor to the last mark
    pub fn reset(&mut self, buffer_mgr: &mut BufferManager) -> HeapResult<()> {
        if self.marked_page_no != self.heap.cur_page_no {
            if let Some(cur) = self.heap.cur_page_no.take() {
                let dirty = self.heap.cur_dirty;
                self.heap.cur_dirty = false;
                buffer_mgr.unpin_page(self.heap.file, cur, dirty)?;
            }
            if let Some(marked) = self.marked_page_no {
                buffer_mgr.read_page(self.heap.file, marked)?;
                self.heap.cur_page_no = Some(marked);
                self.heap.cur_dirty = false;
            }
        }
        self.heap.cur_rid = self.marked_rid;
        Ok(())
    }

    /// Release the cursor page; safe to call when none is held
    pub fn end_scan(&mut self, buffer_mgr: &mut BufferManager) -> HeapResult<()> {
        if let Some(cur) = self.heap.cur_page_no.take() {
            let dirty = self.heap.cur_dirty;
            self.heap.cur_dirty = false;
            self.heap.cur_rid = None;
            buffer_mgr.unpin_page(self.heap.file, cur, dirty)?;
        }
        Ok(())
    }

    /// Number of records in the underlying file
    pub fn rec_cnt(&self) -> u32 {
        self.heap.rec_cnt()
    }

    pub fn close(mut self, buffer_mgr: &mut BufferManager) {
        if let Err(err) = self.end_scan(buffer_mgr) {
            error!("end_scan failed on close: {}", err);
        }
        self.heap.close(buffer_mgr);
    }
}

/// Compare up to `length` bytes with NUL-terminated semantics: the probe
/// is zero-padded and a shared NUL ends the comparison as equal.
fn compare_bounded(attr: &[u8], probe: &[u8], length: usize) -> Ordering {
    for i in 0..length {
        let a = attr.get(i).copied().unwrap_or(0);
        let b = probe.get(i).copied().unwrap_or(0);
        match a.cmp(&b) {
            Ordering::Equal => {
                if a == 0 {
                    return Ordering::Equal;
                }
            }
            other => return other,
        }
    }
    Ordering::Equal
}

/// Appending writer over a heap file: keeps its cursor on the last page
/// and grows the chain when a record does not fit.
pub struct InsertFileScan {
    heap: HeapFile,
}

impl InsertFileScan {
    pub fn open<P: AsRef<std::path::Path>>(
        buffer_mgr: &mut BufferManager,
        path: P,
    ) -> HeapResult<Self> {
        let mut heap = HeapFile::open(buffer_mgr, path)?;
        let last = heap.hdr.last_page;
        if heap.cur_page_no != Some(last) {
            heap.make_current(buffer_mgr, last)?;
        }
        Ok(Self { heap })
    }

    /// Insert a record at the end of the file and return its identifier
    pub fn insert_record(
        &mut self,
        buffer_mgr: &mut BufferManager,
        data: &[u8],
    ) -> HeapResult<RecordId> {
        if data.len() > MAX_RECORD_SIZE {
            // will never fit on any page
            return Err(HeapError::InvalidRecordLength {
                len: data.len(),
                max: MAX_RECORD_SIZE,
            });
        }

        let file = self.heap.file;
        if self.heap.cur_page_no.is_none() {
            let last = self.heap.hdr.last_page;
            buffer_mgr.read_page(file, last)?;
            self.heap.cur_page_no = Some(last);
            self.heap.cur_dirty = false;
        }
        let Some(cur_no) = self.heap.cur_page_no else {
            return Err(HeapError::NoCurrentRecord);
        };

        let free = DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?.free_space();
        if free >= data.len() {
            let rid =
                DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?.insert_record(data)?;
            self.heap.cur_dirty = true;
            self.heap.hdr.rec_cnt += 1;
            self.heap.hdr_dirty = true;
            self.heap.cur_rid = Some(rid);
            return Ok(rid);
        }

        // Current page is full: grow the chain. The link must land in the
        // old page while it is still pinned, before the unpin releases it.
        let (new_no, new_buf) = buffer_mgr.alloc_page(file)?;
        DataPage::init(new_buf, new_no)?;

        DataPage::from_buffer(buffer_mgr.page_mut(file, cur_no)?)?.set_next_page(Some(new_no));
        self.heap.cur_page_no = Some(new_no);
        self.heap.cur_dirty = false;
        buffer_mgr.unpin_page(file, cur_no, true)?;

        let rid = DataPage::from_buffer(buffer_mgr.page_mut(file, new_no)?)?.insert_record(data)?;
        self.heap.cur_dirty = true;
        self.heap.hdr.last_page = new_no;
        self.heap.hdr.page_cnt += 1;
        self.heap.hdr.rec_cnt += 1;
        self.heap.hdr_dirty = true;
        self.heap.cur_rid = Some(rid);
        Ok(rid)
    }

    /// Number of records in the underlying file
    pub fn rec_cnt(&self) -> u32 {
        self.heap.rec_cnt()
    }

    pub fn close(mut self, buffer_mgr: &mut BufferManager) {
        // every insert path dirtied the cursor page
        if self.heap.cur_page_no.is_some() {
            self.heap.cur_dirty = true;
        }
        self.heap.close(buffer_mgr);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::file::PagedFileManager;
    use crate::heap::{create_heap_file, HeapFile};
    use tempfile::TempDir;

    fn setup_heap(records: &[&[u8]]) -> (TempDir, BufferManager, std::path::PathBuf) {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("t");
        let mut bm = BufferManager::with_capacity(PagedFileManager::new(), 16);

        create_heap_file(&mut bm, &path).unwrap();
        let mut ifs = InsertFileScan::open(&mut bm, &path).unwrap();
        for rec in records {
            ifs.insert_record(&mut bm, rec).unwrap();
        }
        ifs.close(&mut bm);

        (temp_dir, bm, path)
    }

    fn collect(
        scan: &mut HeapFileScan,
        bm: &mut BufferManager,
    ) -> Vec<(RecordId, Vec<u8>)> {
        let mut out = Vec::new();
        while let Some(rid) = scan.scan_next(bm).unwrap() {
            out.push((rid, scan.get_record(bm).unwrap().data));
        }
        out
    }

    #[test]
    fn test_unfiltered_scan_in_insertion_order() {
        let (_tmp, mut bm, path) =
            setup_heap(&[b"aaaaaaaaaa", b"bbbbbbbbbb", b"cccccccccc"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        let rows = collect(&mut scan, &mut bm);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].1, b"aaaaaaaaaa");
        assert_eq!(rows[1].1, b"bbbbbbbbbb");
        assert_eq!(rows[2].1, b"cccccccccc");
        scan.close(&mut bm);
    }

    #[test]
    fn test_string_eq_filter_selects_single_record() {
        let (_tmp, mut bm, path) =
            setup_heap(&[b"aaaaaaaaaa", b"bbbbbbbbbb", b"cccccccccc"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.start_scan(0, 10, AttrType::Str, Some(b"bbbbbbbbbb"), CompOp::Eq)
            .unwrap();

        let rid = scan.scan_next(&mut bm).unwrap().unwrap();
        assert_eq!(scan.get_record(&mut bm).unwrap().data, b"bbbbbbbbbb");
        assert_eq!(rid.slot_no, 1);
        assert_eq!(scan.scan_next(&mut bm).unwrap(), None);
        scan.close(&mut bm);
    }

    #[test]
    fn test_string_ne_filter_selects_others_in_order() {
        let (_tmp, mut bm, path) =
            setup_heap(&[b"aaaaaaaaaa", b"bbbbbbbbbb", b"cccccccccc"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.start_scan(0, 10, AttrType::Str, Some(b"bbbbbbbbbb"), CompOp::Ne)
            .unwrap();

        let first = scan.scan_next(&mut bm).unwrap().unwrap();
        assert_eq!(scan.get_record(&mut bm).unwrap().data, b"aaaaaaaaaa");
        let second = scan.scan_next(&mut bm).unwrap().unwrap();
        assert_eq!(scan.get_record(&mut bm).unwrap().data, b"cccccccccc");
        assert!(first.slot_no < second.slot_no);
        assert_eq!(scan.scan_next(&mut bm).unwrap(), None);
        scan.close(&mut bm);
    }

    #[test]
    fn test_int_filter() {
        let mut records: Vec<Vec<u8>> = Vec::new();
        for i in 0..6i32 {
            let mut rec = i.to_le_bytes().to_vec();
            rec.extend_from_slice(b"pad!");
            records.push(rec);
        }
        let refs: Vec<&[u8]> = records.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        let probe = 3i32.to_le_bytes();
        scan.start_scan(0, 4, AttrType::Int, Some(&probe), CompOp::Gte)
            .unwrap();

        let rows = collect(&mut scan, &mut bm);
        let keys: Vec<i32> = rows
            .iter()
            .map(|(_, data)| i32::from_le_bytes([data[0], data[1], data[2], data[3]]))
            .collect();
        assert_eq!(keys, vec![3, 4, 5]);
        scan.close(&mut bm);
    }

    #[test]
    fn test_float_filter() {
        let mut records: Vec<Vec<u8>> = Vec::new();
        for f in [1.5f32, 2.5, 3.5] {
            records.push(f.to_le_bytes().to_vec());
        }
        let refs: Vec<&[u8]> = records.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        let probe = 2.5f32.to_le_bytes();
        scan.start_scan(0, 4, AttrType::Float, Some(&probe), CompOp::Lt)
            .unwrap();

        let rows = collect(&mut scan, &mut bm);
        assert_eq!(rows.len(), 1);
        assert_eq!(
            f32::from_le_bytes([rows[0].1[0], rows[0].1[1], rows[0].1[2], rows[0].1[3]]),
            1.5
        );
        scan.close(&mut bm);
    }

    #[test]
    fn test_scan_empty_file_ends_immediately() {
        let (_tmp, mut bm, path) = setup_heap(&[]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.end_scan(&mut bm).unwrap(); // drop the pre-pinned first page
        assert_eq!(scan.scan_next(&mut bm).unwrap(), None);
        scan.close(&mut bm);
    }

    #[test]
    fn test_start_scan_validation() {
        let (_tmp, mut bm, path) = setup_heap(&[b"aaaa"]);
        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();

        let result = scan.start_scan(0, 0, AttrType::Str, Some(b"x"), CompOp::Eq);
        assert!(matches!(result, Err(HeapError::BadScanParam(_))));

        let result = scan.start_scan(0, 3, AttrType::Int, Some(&[0, 0, 0, 0]), CompOp::Eq);
        assert!(matches!(result, Err(HeapError::BadScanParam(_))));

        let result = scan.start_scan(0, 4, AttrType::Float, Some(&[0, 0]), CompOp::Eq);
        assert!(matches!(result, Err(HeapError::BadScanParam(_))));

        // no value means match-all, regardless of length
        scan.start_scan(0, 0, AttrType::Str, None, CompOp::Eq).unwrap();
        scan.close(&mut bm);
    }

    #[test]
    fn test_filter_out_of_range_field_never_matches() {
        let (_tmp, mut bm, path) = setup_heap(&[b"ab"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.start_scan(1, 5, AttrType::Str, Some(b"b"), CompOp::Eq)
            .unwrap();
        assert_eq!(scan.scan_next(&mut bm).unwrap(), None);
        scan.close(&mut bm);
    }

    #[test]
    fn test_scan_spans_page_chain() {
        // 2000-byte records: four per page, so nine span three pages
        let big: Vec<Vec<u8>> = (0..9u8).map(|i| vec![i; 2000]).collect();
        let refs: Vec<&[u8]> = big.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        let rows = collect(&mut scan, &mut bm);
        assert_eq!(rows.len(), 9);
        for (i, (_, data)) in rows.iter().enumerate() {
            assert_eq!(data[0], i as u8);
        }
        scan.close(&mut bm);

        let hf = HeapFile::open(&mut bm, &path).unwrap();
        assert_eq!(hf.page_cnt(), 3);
        assert_eq!(hf.rec_cnt(), 9);
        hf.close(&mut bm);
    }

    #[test]
    fn test_insert_overflow_links_new_page() {
        let big: Vec<Vec<u8>> = (0..4u8).map(|i| vec![i; 2000]).collect();
        let refs: Vec<&[u8]> = big.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let hf = HeapFile::open(&mut bm, &path).unwrap();
        let old_last = hf.last_page();
        assert_eq!(hf.page_cnt(), 1);
        hf.close(&mut bm);

        // the last page cannot take another 200 bytes
        let mut ifs = InsertFileScan::open(&mut bm, &path).unwrap();
        let rid = ifs.insert_record(&mut bm, &[42u8; 200]).unwrap();
        ifs.close(&mut bm);

        let hf = HeapFile::open(&mut bm, &path).unwrap();
        assert_eq!(hf.page_cnt(), 2);
        assert_eq!(hf.last_page(), rid.page_no);
        assert_ne!(hf.last_page(), old_last);
        hf.close(&mut bm);

        // the old last page links to the new one
        let file = bm.file_manager_mut().open_file(&path).unwrap();
        bm.read_page(file, old_last).unwrap();
        let next = DataPage::from_buffer(bm.page_mut(file, old_last).unwrap())
            .unwrap()
            .next_page();
        bm.unpin_page(file, old_last, false).unwrap();
        assert_eq!(next, Some(rid.page_no));

        // and the record is reachable by a scan
        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        let rows = collect(&mut scan, &mut bm);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[4].1, vec![42u8; 200]);
        scan.close(&mut bm);
    }

    #[test]
    fn test_insert_rejects_oversized_record() {
        let (_tmp, mut bm, path) = setup_heap(&[]);

        let mut ifs = InsertFileScan::open(&mut bm, &path).unwrap();
        let result = ifs.insert_record(&mut bm, &vec![0u8; MAX_RECORD_SIZE + 1]);
        assert!(matches!(
            result,
            Err(HeapError::InvalidRecordLength { .. })
        ));

        // an exact-fit record is accepted
        ifs.insert_record(&mut bm, &vec![1u8; MAX_RECORD_SIZE]).unwrap();
        ifs.close(&mut bm);
    }

    #[test]
    fn test_delete_all_records() {
        let (_tmp, mut bm, path) =
            setup_heap(&[b"r1", b"r2", b"r3", b"r4", b"r5"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.start_scan(0, 0, AttrType::Str, None, CompOp::Eq).unwrap();
        let mut deleted = 0;
        while scan.scan_next(&mut bm).unwrap().is_some() {
            scan.delete_record(&mut bm).unwrap();
            deleted += 1;
        }
        assert_eq!(deleted, 5);
        assert_eq!(scan.rec_cnt(), 0);
        scan.close(&mut bm);

        // a fresh scan finds nothing at all
        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.end_scan(&mut bm).unwrap();
        assert_eq!(scan.scan_next(&mut bm).unwrap(), None);
        scan.close(&mut bm);
    }

    #[test]
    fn test_mark_and_reset() {
        let (_tmp, mut bm, path) =
            setup_heap(&[b"aaaa", b"bbbb", b"cccc", b"dddd"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.scan_next(&mut bm).unwrap().unwrap(); // on "aaaa"
        scan.mark();

        scan.scan_next(&mut bm).unwrap().unwrap(); // "bbbb"
        scan.scan_next(&mut bm).unwrap().unwrap(); // "cccc"

        scan.reset(&mut bm).unwrap();
        scan.scan_next(&mut bm).unwrap().unwrap();
        assert_eq!(scan.get_record(&mut bm).unwrap().data, b"bbbb");
        scan.close(&mut bm);
    }

    #[test]
    fn test_mark_and_reset_across_pages() {
        let big: Vec<Vec<u8>> = (0..9u8).map(|i| vec![i; 2000]).collect();
        let refs: Vec<&[u8]> = big.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.scan_next(&mut bm).unwrap().unwrap(); // record 0
        scan.mark();

        // run to a later page
        for _ in 0..6 {
            scan.scan_next(&mut bm).unwrap().unwrap();
        }
        scan.reset(&mut bm).unwrap();

        scan.scan_next(&mut bm).unwrap().unwrap();
        assert_eq!(scan.get_record(&mut bm).unwrap().data[0], 1);
        scan.close(&mut bm);
    }

    #[test]
    fn test_end_scan_is_idempotent() {
        let (_tmp, mut bm, path) = setup_heap(&[b"only"]);

        let mut scan = HeapFileScan::open(&mut bm, &path).unwrap();
        scan.scan_next(&mut bm).unwrap().unwrap();
        scan.end_scan(&mut bm).unwrap();
        scan.end_scan(&mut bm).unwrap();
        scan.close(&mut bm);
    }

    #[test]
    fn test_insert_scan_positions_on_last_page() {
        let big: Vec<Vec<u8>> = (0..9u8).map(|i| vec![i; 2000]).collect();
        let refs: Vec<&[u8]> = big.iter().map(|r| r.as_slice()).collect();
        let (_tmp, mut bm, path) = setup_heap(&refs);

        let mut ifs = InsertFileScan::open(&mut bm, &path).unwrap();
        let rid = ifs.insert_record(&mut bm, &[9u8; 100]).unwrap();
        ifs.close(&mut bm);

        let hf = HeapFile::open(&mut bm, &path).unwrap();
        assert_eq!(hf.last_page(), rid.page_no);
        // no page was added: the record fit on the existing last page
        assert_eq!(hf.page_cnt(), 3);
        hf.close(&mut bm);
    }
}
