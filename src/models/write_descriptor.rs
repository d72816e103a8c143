use serde::{Deserialize, Serialize};

use super::ids::{CollectionId, ColumnId, ItemId};

/// One pending write: copy `value` into `target_column_id` of a sub-record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WriteDescriptor {
    pub sub_record_id: ItemId,
    pub collection_id: CollectionId,
    pub target_column_id: ColumnId,
    pub value: String,
}

/// A contiguous slice of the write plan sent as one composite mutation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    /// 1-based position in the plan
    pub number: usize,
    /// Offset of the first descriptor within the full plan
    pub offset: usize,
    pub descriptors: Vec<WriteDescriptor>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
