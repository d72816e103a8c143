use serde::{Deserialize, Serialize};

use super::ids::{CollectionId, ColumnId, ItemId};

/// Top-level record (an item) with its nested sub-records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ItemId,
    pub name: String,
    pub subrecords: Vec<SubRecord>,
}

/// Child record (a subitem)
///
/// Sub-records usually live in a different collection than their parent, so
/// each one carries its own owning collection id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubRecord {
    pub id: ItemId,
    pub parent_collection_id: CollectionId,
    pub column_values: Vec<ColumnValue>,
}

/// One cell of a sub-record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnValue {
    pub column_id: ColumnId,
    pub column_title: String,
    /// Type tag reported by the store (e.g. `creation_log`, `date`, `text`)
    pub column_type: String,
    /// Serialized payload exactly as the store returned it
    pub raw_value: Option<String>,
}

impl ColumnValue {
    pub fn has_type(&self, type_tag: &str) -> bool {
        self.column_type == type_tag
    }

    /// The raw payload, unless it is absent, blank, or a JSON `null`
    pub fn non_empty_value(&self) -> Option<&str> {
        match self.raw_value.as_deref().map(str::trim) {
            None | Some("") | Some("null") => None,
            Some(_) => self.raw_value.as_deref(),
        }
    }
}

/// A column a caller can pick as the duplication target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnOption {
    pub id: ColumnId,
    pub title: String,
}
