use super::{encode_value, QueryResult};
use crate::catalog::Catalog;
use crate::file::BufferManager;
use crate::heap::{AttrType, CompOp, HeapFileScan};

/// Delete records from `relation`. With no attribute (or an empty name)
/// every record goes; otherwise only those matching the predicate.
/// Returns the number of records deleted.
pub fn delete(
    buffer_mgr: &mut BufferManager,
    catalog: &Catalog,
    relation: &str,
    attr: Option<&str>,
    op: CompOp,
    value: Option<&str>,
) -> QueryResult<usize> {
    let mut scan = HeapFileScan::open(buffer_mgr, catalog.file_path(relation))?;
    let outcome = scan_delete(buffer_mgr, &mut scan, catalog, relation, attr, op, value);
    scan.close(buffer_mgr);
    outcome
}

fn scan_delete(
    buffer_mgr: &mut BufferManager,
    scan: &mut HeapFileScan,
    catalog: &Catalog,
    relation: &str,
    attr: Option<&str>,
    op: CompOp,
    value: Option<&str>,
) -> QueryResult<usize> {
    match attr {
        None | Some("") => {
            // match-all scan
            scan.start_scan(0, 0, AttrType::Str, None, op)?;
        }
        Some(attr_name) => {
            let desc = catalog.get_attr(relation, attr_name)?;
            let probe = match value {
                Some(raw) => Some(encode_value(desc.attr_type, raw, attr_name)?),
                None => None,
            };
            scan.start_scan(
                desc.attr_offset,
                desc.attr_len,
                desc.attr_type,
                probe.as_deref(),
                op,
            )?;
        }
    }

    let mut count = 0usize;
    while scan.scan_next(buffer_mgr)?.is_some() {
        scan.delete_record(buffer_mgr)?;
        count += 1;
    }
    Ok(count)
}
