#![allow(dead_code)]

use proptest::prelude::*;

use creation_log_duplicator::{
    CollectionId, ColumnId, ColumnValue, ItemId, Record, SubRecord, WriteDescriptor,
};

/// Strategy for column type tags, weighted towards the creation log
pub fn column_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        3 => Just("creation_log".to_string()),
        1 => Just("text".to_string()),
        1 => Just("date".to_string()),
        1 => Just("status".to_string()),
    ]
}

/// Strategy for raw payloads, including the empty shapes the extractor skips
pub fn raw_value_strategy() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        1 => Just(None),
        1 => Just(Some(String::new())),
        1 => Just(Some("null".to_string())),
        4 => "[a-z0-9:\\-]{1,24}".prop_map(|s| Some(format!("{{\"created_at\":\"{s}\"}}"))),
    ]
}

pub fn column_value_strategy() -> impl Strategy<Value = ColumnValue> {
    ("[a-z_]{1,12}", column_type_strategy(), raw_value_strategy()).prop_map(
        |(id, column_type, raw_value)| ColumnValue {
            column_title: id.clone(),
            column_id: ColumnId::new(id),
            column_type,
            raw_value,
        },
    )
}

pub fn sub_record_strategy() -> impl Strategy<Value = SubRecord> {
    (
        "[0-9]{1,10}",
        "[0-9]{1,4}",
        prop::collection::vec(column_value_strategy(), 0..5),
    )
        .prop_map(|(id, board, column_values)| SubRecord {
            id: ItemId::new(id),
            parent_collection_id: CollectionId::new(board),
            column_values,
        })
}

pub fn records_strategy() -> impl Strategy<Value = Vec<Record>> {
    prop::collection::vec(
        ("[0-9]{1,10}", prop::collection::vec(sub_record_strategy(), 0..4)).prop_map(
            |(id, subrecords)| Record {
                name: format!("Item {id}"),
                id: ItemId::new(id),
                subrecords,
            },
        ),
        0..20,
    )
}

pub fn descriptors_strategy() -> impl Strategy<Value = Vec<WriteDescriptor>> {
    prop::collection::vec(
        ("[0-9]{1,10}", "[0-9]{1,4}").prop_map(|(item, board)| WriteDescriptor {
            value: format!("{{\"item\":\"{item}\"}}"),
            sub_record_id: ItemId::new(item),
            collection_id: CollectionId::new(board),
            target_column_id: ColumnId::new("date4"),
        }),
        0..400,
    )
}
