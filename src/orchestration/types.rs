//! # Orchestration Types
//!
//! Outcome types shared by the batch executor and the run entry point.
//!
//! A run is described along two independent axes: whether every batch was
//! attempted ([`Completion`]) and how many batches the remote store accepted.
//! The configured [`SuccessPolicy`] decides how those combine into the
//! terminal [`RunState`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::SuccessPolicy;
use crate::orchestration::progress_tracker::RunProgress;
use crate::state_machine::RunState;

/// Whether the run walked its whole batch plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Completion {
    /// Every batch in the plan was sent (accepted or not)
    AttemptedAll,
    /// The run stopped before the end of the plan
    Aborted,
}

/// What happened to one batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BatchStatus {
    /// The composite call returned; `rejected_items` operations reported errors inside it
    Succeeded { rejected_items: usize },
    /// The composite call failed as a whole
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub batch_number: usize,
    pub len: usize,
    pub status: BatchStatus,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self.status, BatchStatus::Succeeded { .. })
    }
}

/// Result of walking a batch plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub completion: Completion,
    /// Terminal progress snapshot
    pub progress: RunProgress,
    pub batch_outcomes: Vec<BatchOutcome>,
}

impl ExecutionOutcome {
    pub fn batches_attempted(&self) -> usize {
        self.batch_outcomes.len()
    }

    pub fn batches_failed(&self) -> usize {
        self.batch_outcomes.iter().filter(|o| !o.is_success()).count()
    }

    pub fn batches_succeeded(&self) -> usize {
        self.batches_attempted() - self.batches_failed()
    }

    pub fn items_rejected(&self) -> usize {
        self.batch_outcomes
            .iter()
            .map(|o| match o.status {
                BatchStatus::Succeeded { rejected_items } => rejected_items,
                BatchStatus::Failed { .. } => 0,
            })
            .sum()
    }
}

/// Summary of one duplication run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub run_id: String,
    pub collection_id: String,
    pub target_column_id: String,
    pub records_fetched: usize,
    pub batch_count: usize,
    pub batches_succeeded: usize,
    pub batches_failed: usize,
    pub items_rejected: usize,
    pub completion: Completion,
    pub success_policy: SuccessPolicy,
    pub progress: RunProgress,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    /// Terminal state reached under the configured success policy
    pub fn final_state(&self) -> RunState {
        self.progress.state
    }

    pub fn is_success(&self) -> bool {
        self.final_state() == RunState::Succeeded
    }

    /// True only when every batch was attempted and accepted
    pub fn all_batches_succeeded(&self) -> bool {
        self.completion == Completion::AttemptedAll && self.batches_failed == 0
    }

    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
