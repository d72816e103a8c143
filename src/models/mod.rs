//! # Record Store Models
//!
//! In-memory shapes of the remote collection (records, sub-records and their
//! column values) and the write operations derived from them.

pub mod ids;
pub mod record;
pub mod write_descriptor;

pub use ids::{CollectionId, ColumnId, ItemId};
pub use record::{ColumnOption, ColumnValue, Record, SubRecord};
pub use write_descriptor::{Batch, WriteDescriptor};
