//! # Record Store Client
//!
//! The remote collaborator the engine reads from and writes to. The engine only
//! depends on [`RecordStoreApi`]; [`GraphqlRecordStore`] is the HTTP
//! implementation used by the command line tool.

pub mod graphql;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DuplicatorResult;
use crate::models::{CollectionId, ItemId, Record, WriteDescriptor};

pub use graphql::GraphqlRecordStore;

/// One page of a cursor-paginated collection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemsPage {
    pub items: Vec<Record>,
    /// `None` marks the final page
    pub next_cursor: Option<String>,
}

impl ItemsPage {
    pub fn new(items: Vec<Record>, next_cursor: Option<String>) -> Self {
        Self {
            items,
            next_cursor: next_cursor.filter(|c| !c.is_empty()),
        }
    }

    pub fn is_last(&self) -> bool {
        self.next_cursor.is_none()
    }
}

/// Per-operation result inside a composite mutation response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum ItemOutcome {
    Ok,
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationResult {
    pub item_id: ItemId,
    pub outcome: ItemOutcome,
}

impl MutationResult {
    pub fn ok(item_id: ItemId) -> Self {
        Self {
            item_id,
            outcome: ItemOutcome::Ok,
        }
    }

    pub fn error(item_id: ItemId, message: impl Into<String>) -> Self {
        Self {
            item_id,
            outcome: ItemOutcome::Error(message.into()),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ItemOutcome::Ok)
    }
}

/// Request/response channel to the remote record store
#[async_trait]
pub trait RecordStoreApi: Send + Sync {
    /// Number of top-level records in a collection; diagnostic only
    async fn count_items(&self, collection_id: &CollectionId) -> DuplicatorResult<u64>;

    /// Fetch one page of records, continuing from `cursor` when given
    async fn page_items(
        &self,
        collection_id: &CollectionId,
        limit: u32,
        cursor: Option<&str>,
    ) -> DuplicatorResult<ItemsPage>;

    /// Send every operation as a single composite request
    ///
    /// `Err` means the whole call failed and nothing can be assumed applied.
    async fn mutate(&self, operations: &[WriteDescriptor]) -> DuplicatorResult<Vec<MutationResult>>;
}
