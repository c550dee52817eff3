mod delete;
mod error;
mod insert;
mod select;

pub use delete::delete;
pub use error::{QueryError, QueryResult};
pub use insert::insert;
pub use select::select;

use crate::heap::AttrType;

/// Reference to one attribute of a relation
#[derive(Debug, Clone)]
pub struct AttrRef {
    pub rel_name: String,
    pub attr_name: String,
}

impl AttrRef {
    pub fn new(rel_name: &str, attr_name: &str) -> Self {
        Self {
            rel_name: rel_name.to_string(),
            attr_name: attr_name.to_string(),
        }
    }
}

/// A named attribute value, supplied as text
#[derive(Debug, Clone)]
pub struct AttrValue {
    pub attr_name: String,
    pub value: String,
}

impl AttrValue {
    pub fn new(attr_name: &str, value: &str) -> Self {
        Self {
            attr_name: attr_name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Encode a textual value into the little-endian bytes stored in records
/// and compared by scans
pub(crate) fn encode_value(
    attr_type: AttrType,
    raw: &str,
    attr_name: &str,
) -> QueryResult<Vec<u8>> {
    match attr_type {
        AttrType::Int => raw
            .trim()
            .parse::<i32>()
            .map(|v| v.to_le_bytes().to_vec())
            .map_err(|_| {
                QueryError::AttrTypeMismatch(format!(
                    "cannot parse {:?} as INTEGER for attribute {}",
                    raw, attr_name
                ))
            }),
        AttrType::Float => raw
            .trim()
            .parse::<f32>()
            .map(|v| v.to_le_bytes().to_vec())
            .map_err(|_| {
                QueryError::AttrTypeMismatch(format!(
                    "cannot parse {:?} as FLOAT for attribute {}",
                    raw, attr_name
                ))
            }),
        AttrType::Str => Ok(raw.as_bytes().to_vec()),
    }
}
