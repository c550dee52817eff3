use super::{encode_value, AttrValue, QueryError, QueryResult};
use crate::catalog::Catalog;
use crate::file::BufferManager;
use crate::heap::{AttrType, InsertFileScan, RecordId};

/// Insert one record into `relation`, matching the supplied values to the
/// schema by attribute name.
///
/// Every schema attribute must be supplied exactly once; a missing or
/// extra attribute is an `AttrTypeMismatch`.
pub fn insert(
    buffer_mgr: &mut BufferManager,
    catalog: &Catalog,
    relation: &str,
    values: &[AttrValue],
) -> QueryResult<RecordId> {
    catalog.get_rel(relation)?;
    let schema = catalog.rel_attrs(relation)?;

    if schema.len() != values.len() {
        return Err(QueryError::AttrTypeMismatch(format!(
            "relation {} has {} attributes, {} supplied",
            relation,
            schema.len(),
            values.len()
        )));
    }

    let record_len: usize = schema.iter().map(|a| a.attr_len).sum();
    let mut record = vec![0u8; record_len];

    for desc in &schema {
        let supplied = values
            .iter()
            .find(|v| v.attr_name == desc.attr_name)
            .ok_or_else(|| {
                QueryError::AttrTypeMismatch(format!(
                    "no value supplied for attribute {} of {}",
                    desc.attr_name, relation
                ))
            })?;

        let bytes = encode_value(desc.attr_type, &supplied.value, &desc.attr_name)?;
        match desc.attr_type {
            AttrType::Str => {
                // fixed slot: truncate long values, zero-pad short ones
                let n = bytes.len().min(desc.attr_len);
                record[desc.attr_offset..desc.attr_offset + n].copy_from_slice(&bytes[..n]);
            }
            AttrType::Int | AttrType::Float => {
                record[desc.attr_offset..desc.attr_offset + desc.attr_len]
                    .copy_from_slice(&bytes);
            }
        }
    }

    let mut result_scan = InsertFileScan::open(buffer_mgr, catalog.file_path(relation))?;
    let rid = match result_scan.insert_record(buffer_mgr, &record) {
        Ok(rid) => rid,
        Err(err) => {
            result_scan.close(buffer_mgr);
            return Err(err.into());
        }
    };
    result_scan.close(buffer_mgr);
    Ok(rid)
}
