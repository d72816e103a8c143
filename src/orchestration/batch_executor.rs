//! # Batch Executor
//!
//! Sends planned batches to the remote store one at a time.
//!
//! ## Contract
//!
//! - Batches run strictly in plan order, never concurrently.
//! - The throttle runs between consecutive batches, never after the last one.
//! - A failed batch is logged, counted and skipped. It does not advance the
//!   processed count and does not stop the run.
//! - Cancellation is honoured only before a delay or before a batch.
//!
//! The terminal state follows the configured [`SuccessPolicy`]: with
//! `Attempted`, a run that walked the whole plan succeeds even if some batches
//! failed; with `Strict`, any failed batch makes the run fail.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::client::RecordStoreApi;
use crate::config::SuccessPolicy;
use crate::error::{DuplicatorError, DuplicatorResult};
use crate::events::{EventPublisher, RunNotification};
use crate::logging::log_batch_operation;
use crate::models::Batch;
use crate::orchestration::cancellation::CancellationFlag;
use crate::orchestration::progress_tracker::{ProgressTracker, RunProgress};
use crate::orchestration::throttle::Throttle;
use crate::orchestration::types::{BatchOutcome, BatchStatus, Completion, ExecutionOutcome};
use crate::state_machine::RunStateEvent;

pub struct BatchExecutor {
    api: Arc<dyn RecordStoreApi>,
    throttle: Arc<dyn Throttle>,
    tracker: Arc<ProgressTracker>,
    publisher: EventPublisher,
    cancellation: CancellationFlag,
    success_policy: SuccessPolicy,
}

impl std::fmt::Debug for BatchExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchExecutor")
            .field("progress", &self.tracker.snapshot())
            .field("success_policy", &self.success_policy)
            .finish()
    }
}

impl BatchExecutor {
    pub fn new(
        api: Arc<dyn RecordStoreApi>,
        throttle: Arc<dyn Throttle>,
        tracker: Arc<ProgressTracker>,
        publisher: EventPublisher,
    ) -> Self {
        Self {
            api,
            throttle,
            tracker,
            publisher,
            cancellation: CancellationFlag::new(),
            success_policy: SuccessPolicy::default(),
        }
    }

    pub fn with_cancellation(mut self, cancellation: CancellationFlag) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn with_success_policy(mut self, success_policy: SuccessPolicy) -> Self {
        self.success_policy = success_policy;
        self
    }

    /// Execute every batch and drive the tracker to a terminal state
    ///
    /// `on_progress` is called after each accepted batch with the updated
    /// snapshot. Batch failures never surface as `Err`; the only error is a
    /// tracker that was already used by another run.
    pub async fn execute_all<F>(
        &self,
        run_id: &str,
        batches: &[Batch],
        mut on_progress: F,
    ) -> DuplicatorResult<ExecutionOutcome>
    where
        F: FnMut(&RunProgress) + Send,
    {
        let total: usize = batches.iter().map(Batch::len).sum();
        let batch_count = batches.len();

        self.tracker.start(total)?;
        self.publisher.publish(RunNotification::Started {
            run_id: run_id.to_string(),
            total,
            batch_count,
        });
        info!(
            run_id = %run_id,
            total = total,
            batch_count = batch_count,
            "🚀 BATCH_EXECUTOR: Starting batch execution"
        );

        let mut outcomes = Vec::with_capacity(batch_count);
        let mut completion = Completion::AttemptedAll;

        for (index, batch) in batches.iter().enumerate() {
            if index > 0 {
                if self.cancellation.is_cancelled() {
                    completion = Completion::Aborted;
                    break;
                }
                self.throttle.pause(index).await;
            }
            if self.cancellation.is_cancelled() {
                completion = Completion::Aborted;
                break;
            }

            outcomes.push(self.execute_batch(batch, batch_count, &mut on_progress).await);
        }

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        let event = match (completion, self.success_policy) {
            (Completion::Aborted, _) => RunStateEvent::Fail(format!(
                "cancelled after {} of {} batches",
                outcomes.len(),
                batch_count
            )),
            (Completion::AttemptedAll, SuccessPolicy::Strict) if failed > 0 => {
                RunStateEvent::Fail(format!("{failed} of {batch_count} batches failed"))
            }
            (Completion::AttemptedAll, _) => RunStateEvent::Complete,
        };
        let final_state = self.tracker.transition(&event)?;
        let progress = self.tracker.snapshot();

        if failed > 0 {
            warn!(
                run_id = %run_id,
                batches_failed = failed,
                processed = progress.processed_count,
                total = progress.total_count,
                "BATCH_EXECUTOR: Some batches failed"
            );
        }
        info!(
            run_id = %run_id,
            state = %final_state,
            completion = ?completion,
            processed = progress.processed_count,
            total = progress.total_count,
            "✅ BATCH_EXECUTOR: Batch execution finished"
        );

        Ok(ExecutionOutcome {
            completion,
            progress,
            batch_outcomes: outcomes,
        })
    }

    async fn execute_batch<F>(
        &self,
        batch: &Batch,
        batch_count: usize,
        on_progress: &mut F,
    ) -> BatchOutcome
    where
        F: FnMut(&RunProgress) + Send,
    {
        match self.api.mutate(&batch.descriptors).await {
            Ok(results) => {
                let rejected = results.iter().filter(|r| !r.is_ok()).count();
                self.tracker.record_processed(batch.len());
                let progress = self.tracker.snapshot();
                on_progress(&progress);

                self.publisher.publish(RunNotification::BatchCompleted {
                    batch_number: batch.number,
                    processed: progress.processed_count,
                    total: progress.total_count,
                });
                if rejected > 0 {
                    warn!(
                        batch_number = batch.number,
                        rejected_items = rejected,
                        "Remote store rejected some operations in an accepted batch"
                    );
                }
                log_batch_operation(batch.number, batch_count, batch.len(), "succeeded", None);

                BatchOutcome {
                    batch_number: batch.number,
                    len: batch.len(),
                    status: BatchStatus::Succeeded {
                        rejected_items: rejected,
                    },
                }
            }
            Err(err) => {
                if !err.is_recoverable() {
                    warn!(
                        batch_number = batch.number,
                        error = %err,
                        "Remote store returned a non-mutation error; counting it as a failed batch"
                    );
                }
                let err = match err {
                    DuplicatorError::RemoteMutation { message, .. } => {
                        DuplicatorError::remote_mutation(batch.number, message)
                    }
                    other => DuplicatorError::remote_mutation(batch.number, other.to_string()),
                };
                error!(
                    batch_number = batch.number,
                    batch_len = batch.len(),
                    error = %err,
                    "❌ BATCH_EXECUTOR: Batch failed, continuing with next batch"
                );
                log_batch_operation(
                    batch.number,
                    batch_count,
                    batch.len(),
                    "failed",
                    Some(&err.to_string()),
                );
                self.publisher.publish(RunNotification::BatchFailed {
                    batch_number: batch.number,
                    error: err.to_string(),
                });

                BatchOutcome {
                    batch_number: batch.number,
                    len: batch.len(),
                    status: BatchStatus::Failed {
                        error: err.to_string(),
                    },
                }
            }
        }
    }
}
