//! Test data builders for records, sub-records and column values.

#![allow(dead_code)]

use creation_log_duplicator::{CollectionId, ColumnId, ColumnValue, ItemId, Record, SubRecord};

pub const SUBITEM_BOARD: &str = "900";

/// Builder for a sub-record's column set
pub struct SubRecordBuilder {
    id: String,
    board: String,
    columns: Vec<ColumnValue>,
}

impl SubRecordBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            board: SUBITEM_BOARD.to_string(),
            columns: Vec::new(),
        }
    }

    pub fn on_board(mut self, board: &str) -> Self {
        self.board = board.to_string();
        self
    }

    pub fn with_column(mut self, id: &str, column_type: &str, raw: Option<&str>) -> Self {
        self.columns.push(ColumnValue {
            column_id: ColumnId::new(id),
            column_title: title_for(id),
            column_type: column_type.to_string(),
            raw_value: raw.map(str::to_string),
        });
        self
    }

    pub fn with_creation_log(self, raw: &str) -> Self {
        self.with_column("creation_log", "creation_log", Some(raw))
    }

    pub fn build(self) -> SubRecord {
        SubRecord {
            id: ItemId::new(self.id),
            parent_collection_id: CollectionId::new(self.board),
            column_values: self.columns,
        }
    }
}

fn title_for(id: &str) -> String {
    let mut chars = id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>().replace('_', " "),
        None => String::new(),
    }
}

pub fn record(id: impl Into<String>, subrecords: Vec<SubRecord>) -> Record {
    let id = id.into();
    Record {
        name: format!("Item {id}"),
        id: ItemId::new(id),
        subrecords,
    }
}

pub fn creation_log_value(n: usize) -> String {
    format!(r#"{{"created_at":"2024-01-01T00:00:{:02}Z","creator_id":{n}}}"#, n % 60)
}

/// A record whose single sub-record has a text column and a creation log
pub fn flagged_record(n: usize) -> Record {
    record(
        format!("item-{n}"),
        vec![SubRecordBuilder::new(format!("sub-{n}"))
            .with_column("status", "status", Some(r#"{"index":1}"#))
            .with_creation_log(&creation_log_value(n))
            .with_column("date4", "date", None)
            .build()],
    )
}

/// A record whose sub-record has no creation-log value
pub fn unflagged_record(n: usize) -> Record {
    record(
        format!("item-{n}"),
        vec![SubRecordBuilder::new(format!("sub-{n}"))
            .with_column("status", "status", Some(r#"{"index":1}"#))
            .with_column("creation_log", "creation_log", None)
            .build()],
    )
}

/// Pages of flagged records with consecutive numbering across pages
pub fn flagged_pages(sizes: &[usize]) -> Vec<Vec<Record>> {
    let mut next = 0;
    sizes
        .iter()
        .map(|&size| {
            let page = (next..next + size).map(flagged_record).collect();
            next += size;
            page
        })
        .collect()
}
