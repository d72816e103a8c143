//! # Creation Log Extractor
//!
//! Projects every sub-record that carries a creation-log value into a pending
//! write. Output order is record order, then sub-record order within each
//! record, so batch numbering is reproducible across runs.

use tracing::debug;

use crate::models::{ColumnId, ColumnOption, Record, WriteDescriptor};

#[derive(Debug, Clone)]
pub struct CreationLogExtractor {
    type_tag: String,
}

impl CreationLogExtractor {
    /// Extractor matching columns whose type tag equals `type_tag`
    pub fn new(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
        }
    }

    pub fn type_tag(&self) -> &str {
        &self.type_tag
    }

    /// Build one write per sub-record with a non-empty creation-log value
    ///
    /// Only the first creation-log column of a sub-record is considered. Its
    /// payload is forwarded untouched.
    pub fn extract(&self, records: &[Record], target_column_id: &ColumnId) -> Vec<WriteDescriptor> {
        let mut skipped = 0usize;
        let descriptors: Vec<WriteDescriptor> = records
            .iter()
            .flat_map(|record| record.subrecords.iter())
            .filter_map(|sub| {
                let value = sub
                    .column_values
                    .iter()
                    .find(|cv| cv.has_type(&self.type_tag))
                    .and_then(|cv| cv.non_empty_value());

                match value {
                    Some(value) => Some(WriteDescriptor {
                        sub_record_id: sub.id.clone(),
                        collection_id: sub.parent_collection_id.clone(),
                        target_column_id: target_column_id.clone(),
                        value: value.to_string(),
                    }),
                    None => {
                        skipped += 1;
                        None
                    }
                }
            })
            .collect();

        debug!(
            records = records.len(),
            descriptors = descriptors.len(),
            skipped_sub_records = skipped,
            type_tag = %self.type_tag,
            "Extracted creation-log writes"
        );
        descriptors
    }
}

/// Columns offered as duplication targets
///
/// Taken from the first sub-record in traversal order; every sub-record of a
/// collection shares the same column set.
pub fn available_columns(records: &[Record]) -> Vec<ColumnOption> {
    records
        .iter()
        .flat_map(|record| record.subrecords.first())
        .next()
        .map(|sub| {
            sub.column_values
                .iter()
                .map(|cv| ColumnOption {
                    id: cv.column_id.clone(),
                    title: cv.column_title.clone(),
                })
                .collect()
        })
        .unwrap_or_default()
}
