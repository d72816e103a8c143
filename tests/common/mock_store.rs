//! In-memory record store serving scripted pages and recording every call.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;

use creation_log_duplicator::{
    CancellationFlag, CollectionId, DuplicatorError, DuplicatorResult, ItemsPage, MutationResult, Record,
    RecordStoreApi, Throttle, WriteDescriptor,
};

#[derive(Default)]
pub struct MockRecordStore {
    pages: Vec<Vec<Record>>,
    fail_count: bool,
    /// 1-based page call that fails
    fail_page_call: Option<usize>,
    /// 1-based mutation calls that fail as a whole
    fail_mutation_calls: HashSet<usize>,
    /// Sub-record ids reported as per-item errors
    rejected_items: HashSet<String>,
    pub count_calls: Mutex<usize>,
    pub page_calls: Mutex<Vec<Option<String>>>,
    pub mutation_calls: Mutex<Vec<Vec<WriteDescriptor>>>,
}

impl MockRecordStore {
    pub fn with_pages(pages: Vec<Vec<Record>>) -> Self {
        Self {
            pages,
            ..Default::default()
        }
    }

    pub fn failing_count(mut self) -> Self {
        self.fail_count = true;
        self
    }

    pub fn failing_page_call(mut self, call: usize) -> Self {
        self.fail_page_call = Some(call);
        self
    }

    pub fn failing_mutation_call(mut self, call: usize) -> Self {
        self.fail_mutation_calls.insert(call);
        self
    }

    pub fn rejecting_item(mut self, sub_record_id: &str) -> Self {
        self.rejected_items.insert(sub_record_id.to_string());
        self
    }

    pub fn mutation_call_count(&self) -> usize {
        self.mutation_calls.lock().len()
    }

    pub fn mutated_items(&self) -> Vec<WriteDescriptor> {
        self.mutation_calls.lock().iter().flatten().cloned().collect()
    }

    fn cursor_for(index: usize) -> String {
        format!("cursor-{index}")
    }
}

#[async_trait]
impl RecordStoreApi for MockRecordStore {
    async fn count_items(&self, collection_id: &CollectionId) -> DuplicatorResult<u64> {
        *self.count_calls.lock() += 1;
        tokio::task::yield_now().await;
        if self.fail_count {
            return Err(DuplicatorError::remote_query(
                "count_items",
                format!("board {collection_id} unavailable"),
            ));
        }
        Ok(self.pages.iter().map(Vec::len).sum::<usize>() as u64)
    }

    async fn page_items(
        &self,
        _collection_id: &CollectionId,
        _limit: u32,
        cursor: Option<&str>,
    ) -> DuplicatorResult<ItemsPage> {
        let call = {
            let mut calls = self.page_calls.lock();
            calls.push(cursor.map(str::to_string));
            calls.len()
        };
        tokio::task::yield_now().await;
        if self.fail_page_call == Some(call) {
            return Err(DuplicatorError::remote_query(
                "page_items",
                "502 Bad Gateway",
            ));
        }

        let index = match cursor {
            None => 0,
            Some(c) => c
                .strip_prefix("cursor-")
                .and_then(|n| n.parse::<usize>().ok())
                .ok_or_else(|| DuplicatorError::remote_query("page_items", "unknown cursor"))?,
        };
        let items = self.pages.get(index).cloned().unwrap_or_default();
        let next = (index + 1 < self.pages.len()).then(|| Self::cursor_for(index + 1));
        Ok(ItemsPage::new(items, next))
    }

    async fn mutate(&self, operations: &[WriteDescriptor]) -> DuplicatorResult<Vec<MutationResult>> {
        let call = {
            let mut calls = self.mutation_calls.lock();
            calls.push(operations.to_vec());
            calls.len()
        };
        if self.fail_mutation_calls.contains(&call) {
            return Err(DuplicatorError::remote_mutation(
                0,
                "Complexity budget exhausted",
            ));
        }

        Ok(operations
            .iter()
            .map(|op| {
                if self.rejected_items.contains(op.sub_record_id.as_str()) {
                    MutationResult::error(op.sub_record_id.clone(), "invalid value")
                } else {
                    MutationResult::ok(op.sub_record_id.clone())
                }
            })
            .collect())
    }
}

/// Throttle that records pauses instead of sleeping
#[derive(Default)]
pub struct RecordingThrottle {
    pub pauses: Mutex<Vec<usize>>,
    cancel_after: Option<(usize, CancellationFlag)>,
}

impl RecordingThrottle {
    /// Cancel `flag` during the pause that follows batch `completed_batch`
    pub fn cancelling_after(completed_batch: usize, flag: CancellationFlag) -> Self {
        Self {
            pauses: Mutex::new(Vec::new()),
            cancel_after: Some((completed_batch, flag)),
        }
    }

    pub fn pause_count(&self) -> usize {
        self.pauses.lock().len()
    }
}

#[async_trait]
impl Throttle for RecordingThrottle {
    async fn pause(&self, completed_batch: usize) {
        self.pauses.lock().push(completed_batch);
        if let Some((after, flag)) = &self.cancel_after {
            if *after == completed_batch {
                flag.cancel();
            }
        }
        tokio::task::yield_now().await;
    }
}
