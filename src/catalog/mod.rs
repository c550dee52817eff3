use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::heap::AttrType;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Relation {0} not found")]
    RelationNotFound(String),

    #[error("Relation {0} already exists")]
    RelationExists(String),

    #[error("Attribute {1} not found in relation {0}")]
    AttributeNotFound(String, String),
}

pub type CatalogResult<T> = Result<T, CatalogError>;

/// One relation's entry in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelDesc {
    pub rel_name: String,
    pub attr_cnt: usize,
}

/// One attribute's entry: where it sits in the record and what it holds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttrDesc {
    pub rel_name: String,
    pub attr_name: String,
    /// Byte offset of the attribute within the record
    pub attr_offset: usize,
    /// Fixed length of the attribute in bytes
    pub attr_len: usize,
    pub attr_type: AttrType,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogData {
    rels: HashMap<String, RelDesc>,
    /// Attributes per relation, in schema order
    attrs: HashMap<String, Vec<AttrDesc>>,
}

/// Relation and attribute metadata for one database directory,
/// persisted as `catalog.json` next to the heap files it describes
pub struct Catalog {
    data_dir: PathBuf,
    data: CatalogData,
}

impl Catalog {
    const FILE_NAME: &'static str = "catalog.json";

    /// Open the catalog in `data_dir`, loading it when one is present
    pub fn open<P: AsRef<Path>>(data_dir: P) -> CatalogResult<Self> {
        let data_dir = data_dir.as_ref().to_path_buf();
        let path = data_dir.join(Self::FILE_NAME);

        let data = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            CatalogData::default()
        };

        Ok(Self { data_dir, data })
    }

    /// Persist the catalog to its directory
    pub fn save(&self) -> CatalogResult<()> {
        fs::create_dir_all(&self.data_dir)?;
        let path = self.data_dir.join(Self::FILE_NAME);
        let content = serde_json::to_string_pretty(&self.data)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Path of the heap file backing a relation
    pub fn file_path(&self, rel_name: &str) -> PathBuf {
        self.data_dir.join(rel_name)
    }

    /// Register a relation with its attributes in declaration order.
    /// Offsets are packed; Int and Float attributes are always 4 bytes
    /// regardless of the length supplied.
    pub fn add_relation(
        &mut self,
        rel_name: &str,
        attrs: &[(&str, AttrType, usize)],
    ) -> CatalogResult<()> {
        if self.data.rels.contains_key(rel_name) {
            return Err(CatalogError::RelationExists(rel_name.to_string()));
        }

        let mut descs = Vec::with_capacity(attrs.len());
        let mut offset = 0usize;
        for &(attr_name, attr_type, len) in attrs {
            let attr_len = match attr_type {
                AttrType::Int | AttrType::Float => 4,
                AttrType::Str => len,
            };
            descs.push(AttrDesc {
                rel_name: rel_name.to_string(),
                attr_name: attr_name.to_string(),
                attr_offset: offset,
                attr_len,
                attr_type,
            });
            offset += attr_len;
        }

        self.data.rels.insert(
            rel_name.to_string(),
            RelDesc {
                rel_name: rel_name.to_string(),
                attr_cnt: attrs.len(),
            },
        );
        self.data.attrs.insert(rel_name.to_string(), descs);
        Ok(())
    }

    pub fn remove_relation(&mut self, rel_name: &str) -> CatalogResult<()> {
        self.data
            .rels
            .remove(rel_name)
            .ok_or_else(|| CatalogError::RelationNotFound(rel_name.to_string()))?;
        self.data.attrs.remove(rel_name);
        Ok(())
    }

    /// Look up a relation's descriptor
    pub fn get_rel(&self, rel_name: &str) -> CatalogResult<&RelDesc> {
        self.data
            .rels
            .get(rel_name)
            .ok_or_else(|| CatalogError::RelationNotFound(rel_name.to_string()))
    }

    /// Look up one attribute of a relation
    pub fn get_attr(&self, rel_name: &str, attr_name: &str) -> CatalogResult<AttrDesc> {
        let attrs = self
            .data
            .attrs
            .get(rel_name)
            .ok_or_else(|| CatalogError::RelationNotFound(rel_name.to_string()))?;
        attrs
            .iter()
            .find(|a| a.attr_name == attr_name)
            .cloned()
            .ok_or_else(|| {
                CatalogError::AttributeNotFound(rel_name.to_string(), attr_name.to_string())
            })
    }

    /// All attributes of a relation in schema order; the caller owns the
    /// returned vector
    pub fn rel_attrs(&self, rel_name: &str) -> CatalogResult<Vec<AttrDesc>> {
        self.data
            .attrs
            .get(rel_name)
            .cloned()
            .ok_or_else(|| CatalogError::RelationNotFound(rel_name.to_string()))
    }

    /// Total record length of a relation's schema
    pub fn record_len(&self, rel_name: &str) -> CatalogResult<usize> {
        Ok(self.rel_attrs(rel_name)?.iter().map(|a| a.attr_len).sum())
    }
}
