use thiserror::Error;

use crate::catalog::CatalogError;
use crate::heap::HeapError;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Heap error: {0}")]
    Heap(#[from] HeapError),

    #[error("Attribute type mismatch: {0}")]
    AttrTypeMismatch(String),
}

pub type QueryResult<T> = Result<T, QueryError>;
