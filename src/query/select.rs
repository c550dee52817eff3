use super::{encode_value, AttrRef, QueryError, QueryResult};
use crate::catalog::{AttrDesc, Catalog};
use crate::file::BufferManager;
use crate::heap::{AttrType, CompOp, HeapFileScan, InsertFileScan};

/// Select records from a single relation, projecting the named attributes
/// (in the order given) into the pre-existing `result` relation.
///
/// The source relation is taken from the first projection. The filter
/// applies only when both an attribute and a probe value are supplied.
/// Returns the number of result records produced.
pub fn select(
    buffer_mgr: &mut BufferManager,
    catalog: &Catalog,
    result: &str,
    projections: &[AttrRef],
    filter_attr: Option<&AttrRef>,
    op: CompOp,
    value: Option<&str>,
) -> QueryResult<usize> {
    if projections.is_empty() {
        return Err(QueryError::AttrTypeMismatch(
            "select requires at least one projection".to_string(),
        ));
    }

    let filter_desc = match filter_attr {
        Some(attr) => Some(catalog.get_attr(&attr.rel_name, &attr.attr_name)?),
        None => None,
    };
    let probe = match (&filter_desc, value) {
        (Some(desc), Some(raw)) => Some(encode_value(desc.attr_type, raw, &desc.attr_name)?),
        _ => None,
    };

    let mut proj_descs = Vec::with_capacity(projections.len());
    for proj in projections {
        proj_descs.push(catalog.get_attr(&proj.rel_name, &proj.attr_name)?);
    }

    let source = &projections[0].rel_name;
    let mut result_scan = InsertFileScan::open(buffer_mgr, catalog.file_path(result))?;
    let mut scan = match HeapFileScan::open(buffer_mgr, catalog.file_path(source)) {
        Ok(scan) => scan,
        Err(err) => {
            result_scan.close(buffer_mgr);
            return Err(err.into());
        }
    };

    let outcome = scan_select(
        buffer_mgr,
        &mut scan,
        &mut result_scan,
        filter_desc.as_ref(),
        probe.as_deref(),
        op,
        &proj_descs,
    );

    scan.close(buffer_mgr);
    result_scan.close(buffer_mgr);
    outcome
}

/// Drive the source scan and append one projected record per match
fn scan_select(
    buffer_mgr: &mut BufferManager,
    scan: &mut HeapFileScan,
    result_scan: &mut InsertFileScan,
    filter_desc: Option<&AttrDesc>,
    probe: Option<&[u8]>,
    op: CompOp,
    proj_descs: &[AttrDesc],
) -> QueryResult<usize> {
    match filter_desc {
        Some(desc) => {
            scan.start_scan(desc.attr_offset, desc.attr_len, desc.attr_type, probe, op)?
        }
        None => scan.start_scan(0, 0, AttrType::Str, None, op)?,
    }

    let out_len: usize = proj_descs.iter().map(|a| a.attr_len).sum();
    let mut count = 0usize;

    while scan.scan_next(buffer_mgr)?.is_some() {
        let rec = scan.get_record(buffer_mgr)?;

        let mut out = Vec::with_capacity(out_len);
        for desc in proj_descs {
            let end = desc.attr_offset + desc.attr_len;
            if end > rec.data.len() {
                return Err(QueryError::AttrTypeMismatch(format!(
                    "record shorter than attribute {} of {}",
                    desc.attr_name, desc.rel_name
                )));
            }
            out.extend_from_slice(&rec.data[desc.attr_offset..end]);
        }

        result_scan.insert_record(buffer_mgr, &out)?;
        count += 1;
    }

    Ok(count)
}
