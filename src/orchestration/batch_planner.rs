//! # Batch Planner
//!
//! Splits the ordered write list into contiguous batches of at most
//! `batch_size` operations. The last batch may be shorter; small trailing
//! batches are never merged.

use tracing::debug;

use crate::constants::DEFAULT_BATCH_SIZE;
use crate::error::{DuplicatorError, DuplicatorResult};
use crate::models::{Batch, WriteDescriptor};

#[derive(Debug, Clone, Copy)]
pub struct BatchPlanner {
    batch_size: usize,
}

impl Default for BatchPlanner {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

impl BatchPlanner {
    pub fn new(batch_size: usize) -> DuplicatorResult<Self> {
        if batch_size == 0 {
            return Err(DuplicatorError::configuration(
                "batch_size must be greater than zero",
            ));
        }
        Ok(Self { batch_size })
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of batches `count` writes produce
    pub fn batch_count(&self, count: usize) -> usize {
        count.div_ceil(self.batch_size)
    }

    pub fn plan(&self, descriptors: Vec<WriteDescriptor>) -> Vec<Batch> {
        let total = descriptors.len();
        let mut batches = Vec::with_capacity(self.batch_count(total));
        let mut remaining = descriptors.into_iter();
        let mut offset = 0;

        loop {
            let chunk: Vec<WriteDescriptor> = remaining.by_ref().take(self.batch_size).collect();
            if chunk.is_empty() {
                break;
            }
            let len = chunk.len();
            batches.push(Batch {
                number: batches.len() + 1,
                offset,
                descriptors: chunk,
            });
            offset += len;
        }

        debug!(
            descriptors = total,
            batches = batches.len(),
            batch_size = self.batch_size,
            "Planned mutation batches"
        );
        batches
    }
}
