//! Index catalog consumed by the enumerator
//!
//! Entries are addressed by their position ([`IndexId`]). The catalog is
//! validated once, at construction; the enumerator assumes every entry has at
//! least one field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::tag::IndexId;

/// Catalog validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("index {index} declares no fields")]
    NoFields { index: IndexId },

    #[error("index {index} has an empty field name at position {position}")]
    EmptyField { index: IndexId, position: usize },

    #[error("index {index} lists field '{field}' more than once")]
    DuplicateField { index: IndexId, field: String },
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;

/// One index definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Indexed fields in declared (compound) order
    pub fields: Vec<String>,
    /// Built over a field that may hold arrays
    #[serde(default)]
    pub multikey: bool,
}

impl IndexEntry {
    pub fn new(fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            name: None,
            fields: fields.into_iter().map(Into::into).collect(),
            multikey: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn multikey(mut self) -> Self {
        self.multikey = true;
        self
    }

    pub fn is_compound(&self) -> bool {
        self.fields.len() > 1
    }

    /// Explicit name, or `a_1_b_1` style when unnamed
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .fields
                .iter()
                .map(|f| format!("{}_1", f))
                .collect::<Vec<_>>()
                .join("_"),
        }
    }
}

/// Validated, ordered set of indexes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexCatalog {
    entries: Vec<IndexEntry>,
}

impl IndexCatalog {
    /// Validates and wraps the given entries
    pub fn new(entries: Vec<IndexEntry>) -> CatalogResult<Self> {
        for (index, entry) in entries.iter().enumerate() {
            if entry.fields.is_empty() {
                return Err(CatalogError::NoFields { index });
            }
            for (position, field) in entry.fields.iter().enumerate() {
                if field.is_empty() {
                    return Err(CatalogError::EmptyField { index, position });
                }
                if entry.fields[..position].contains(field) {
                    return Err(CatalogError::DuplicateField {
                        index,
                        field: field.clone(),
                    });
                }
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, id: IndexId) -> Option<&IndexEntry> {
        self.entries.get(id)
    }

    /// Returns true if the index spans more than one field
    pub fn is_compound(&self, id: IndexId) -> bool {
        self.get(id).is_some_and(IndexEntry::is_compound)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (IndexId, &IndexEntry)> {
        self.entries.iter().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_catalog() {
        let catalog = IndexCatalog::new(vec![
            IndexEntry::new(["a"]),
            IndexEntry::new(["a", "b", "c"]).multikey(),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert!(!catalog.is_compound(0));
        assert!(catalog.is_compound(1));
        assert!(!catalog.is_compound(7));
        assert!(catalog.get(1).unwrap().multikey);
    }

    #[test]
    fn test_zero_field_index_rejected() {
        let err = IndexCatalog::new(vec![IndexEntry::new(["a"]), IndexEntry::new(Vec::<String>::new())])
            .unwrap_err();
        assert_eq!(err, CatalogError::NoFields { index: 1 });
    }

    #[test]
    fn test_empty_field_rejected() {
        let err = IndexCatalog::new(vec![IndexEntry::new(["a", ""])]).unwrap_err();
        assert_eq!(err, CatalogError::EmptyField { index: 0, position: 1 });
    }

    #[test]
    fn test_duplicate_field_rejected() {
        let err = IndexCatalog::new(vec![IndexEntry::new(["a", "b", "a"])]).unwrap_err();
        assert!(err.to_string().contains("'a'"));
    }

    #[test]
    fn test_display_name() {
        assert_eq!(IndexEntry::new(["a", "b"]).display_name(), "a_1_b_1");
        assert_eq!(IndexEntry::new(["a"]).named("by_a").display_name(), "by_a");
    }

    #[test]
    fn test_entry_from_json() {
        let entry: IndexEntry =
            serde_json::from_value(serde_json::json!({"fields": ["x", "y"]})).unwrap();
        assert!(!entry.multikey);
        assert!(entry.is_compound());
    }
}
