//! # Creation Log Duplicator
//!
//! Entry point for one duplication run: fetch the whole collection, extract
//! creation-log values, plan batches and execute them.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use creation_log_duplicator::{
//!     CollectionId, ColumnId, CreationLogDuplicator, DuplicatorConfig, GraphqlRecordStore,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DuplicatorConfig::load(None)?;
//! let store = Arc::new(GraphqlRecordStore::new(&config)?);
//! let duplicator = CreationLogDuplicator::new(store, config)?;
//!
//! let report = duplicator
//!     .run(&CollectionId::new("1234567890"), &ColumnId::new("date4"))
//!     .await?;
//! println!(
//!     "{} / {} sub-records updated",
//!     report.progress.processed_count, report.progress.total_count
//! );
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::client::RecordStoreApi;
use crate::config::DuplicatorConfig;
use crate::error::{DuplicatorError, DuplicatorResult};
use crate::events::{EventPublisher, PublishedNotification, RunNotification};
use crate::logging::log_run_operation;
use crate::models::{CollectionId, ColumnId, ColumnOption};
use crate::orchestration::batch_executor::BatchExecutor;
use crate::orchestration::batch_planner::BatchPlanner;
use crate::orchestration::cancellation::CancellationFlag;
use crate::orchestration::creation_log_extractor::{available_columns, CreationLogExtractor};
use crate::orchestration::page_fetcher::PageFetcher;
use crate::orchestration::progress_tracker::{ProgressTracker, RunProgress};
use crate::orchestration::throttle::{FixedDelayThrottle, Throttle};
use crate::orchestration::types::RunReport;
use crate::state_machine::{RunState, RunStateEvent};

/// One duplication run and the state a caller can observe while it runs
pub struct CreationLogDuplicator {
    api: Arc<dyn RecordStoreApi>,
    config: DuplicatorConfig,
    throttle: Arc<dyn Throttle>,
    tracker: Arc<ProgressTracker>,
    publisher: EventPublisher,
    cancellation: CancellationFlag,
    run_id: String,
    /// Set once by the first accepted `run`; a duplicator runs at most once
    started: AtomicBool,
}

impl std::fmt::Debug for CreationLogDuplicator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreationLogDuplicator")
            .field("run_id", &self.run_id)
            .field("progress", &self.tracker.snapshot())
            .finish()
    }
}

impl CreationLogDuplicator {
    /// Create a run against `api`, throttled by the configured fixed delay
    pub fn new(api: Arc<dyn RecordStoreApi>, config: DuplicatorConfig) -> DuplicatorResult<Self> {
        config.validate()?;
        let throttle = Arc::new(FixedDelayThrottle::new(config.inter_batch_delay()));

        Ok(Self {
            api,
            config,
            throttle,
            tracker: Arc::new(ProgressTracker::new()),
            publisher: EventPublisher::default(),
            cancellation: CancellationFlag::new(),
            run_id: Uuid::new_v4().to_string(),
            started: AtomicBool::new(false),
        })
    }

    /// Replace the inter-batch throttle
    pub fn with_throttle(mut self, throttle: Arc<dyn Throttle>) -> Self {
        self.throttle = throttle;
        self
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn config(&self) -> &DuplicatorConfig {
        &self.config
    }

    /// Current progress snapshot; may lag the executor by one update
    pub fn progress(&self) -> RunProgress {
        self.tracker.snapshot()
    }

    /// Shared tracker for readers that outlive a borrow of the duplicator
    pub fn progress_tracker(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.tracker)
    }

    /// Receive run notifications published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<PublishedNotification> {
        self.publisher.subscribe()
    }

    /// Handle the caller can use to stop the run at the next boundary
    pub fn cancellation(&self) -> CancellationFlag {
        self.cancellation.clone()
    }

    /// Columns available as duplication targets, read from the first page only
    pub async fn available_columns(
        &self,
        collection_id: &CollectionId,
    ) -> DuplicatorResult<Vec<ColumnOption>> {
        if collection_id.is_empty() {
            return Err(DuplicatorError::configuration(
                "a collection id is required",
            ));
        }
        let fetcher = PageFetcher::new(Arc::clone(&self.api), &self.config);
        let mut paginator = fetcher
            .paginator(collection_id)
            .with_cancellation(self.cancellation.clone());
        let first_page = paginator.next_page().await?.unwrap_or_default();
        Ok(available_columns(&first_page))
    }

    /// Run the duplication without a progress callback
    pub async fn run(
        &self,
        collection_id: &CollectionId,
        target_column_id: &ColumnId,
    ) -> DuplicatorResult<RunReport> {
        self.run_with_progress(collection_id, target_column_id, |_| {})
            .await
    }

    /// Run the duplication, calling `on_progress` after each accepted batch
    ///
    /// Missing ids are rejected before any remote call. A failed read aborts
    /// the run before any write is attempted. Failed batches are reflected in
    /// the report, not returned as errors.
    pub async fn run_with_progress<F>(
        &self,
        collection_id: &CollectionId,
        target_column_id: &ColumnId,
        on_progress: F,
    ) -> DuplicatorResult<RunReport>
    where
        F: FnMut(&RunProgress) + Send,
    {
        if target_column_id.is_empty() {
            return Err(DuplicatorError::configuration(
                "a target column must be selected",
            ));
        }
        if collection_id.is_empty() {
            return Err(DuplicatorError::configuration(
                "a collection id is required",
            ));
        }
        self.claim()?;

        let started_at = Utc::now();
        log_run_operation(
            "run",
            &self.run_id,
            collection_id.as_str(),
            "started",
            Some(&format!("target_column={target_column_id}")),
        );

        let fetcher = PageFetcher::new(Arc::clone(&self.api), &self.config);
        let records = match fetcher.fetch_all(collection_id, &self.cancellation).await {
            Ok(records) => records,
            Err(err) => return Err(self.abort(collection_id, err)),
        };

        let extractor = CreationLogExtractor::new(self.config.creation_log_type.clone());
        let descriptors = extractor.extract(&records, target_column_id);
        let planner = BatchPlanner::new(self.config.batch_size)?;
        let batches = planner.plan(descriptors);

        info!(
            run_id = %self.run_id,
            records = records.len(),
            writes = batches.iter().map(|b| b.len()).sum::<usize>(),
            batches = batches.len(),
            "📋 RUN: Write plan ready"
        );

        let executor = BatchExecutor::new(
            Arc::clone(&self.api),
            Arc::clone(&self.throttle),
            Arc::clone(&self.tracker),
            self.publisher.clone(),
        )
        .with_cancellation(self.cancellation.clone())
        .with_success_policy(self.config.success_policy);

        let outcome = executor
            .execute_all(&self.run_id, &batches, on_progress)
            .await?;

        let report = RunReport {
            run_id: self.run_id.clone(),
            collection_id: collection_id.to_string(),
            target_column_id: target_column_id.to_string(),
            records_fetched: records.len(),
            batch_count: batches.len(),
            batches_succeeded: outcome.batches_succeeded(),
            batches_failed: outcome.batches_failed(),
            items_rejected: outcome.items_rejected(),
            completion: outcome.completion,
            success_policy: self.config.success_policy,
            progress: outcome.progress,
            started_at,
            finished_at: Utc::now(),
        };

        log_run_operation(
            "run",
            &self.run_id,
            collection_id.as_str(),
            &report.final_state().to_string(),
            Some(&format!(
                "processed={}/{} batches_failed={}",
                report.progress.processed_count, report.progress.total_count, report.batches_failed
            )),
        );
        self.publisher.publish(RunNotification::Finished {
            report: report.clone(),
        });

        Ok(report)
    }

    /// Reserve this duplicator for the calling run before any remote call
    ///
    /// Overlapping or repeated calls are rejected; only the claiming run ever
    /// drives the tracker.
    fn claim(&self) -> DuplicatorResult<()> {
        let state = self.tracker.state();
        let claimed = state == RunState::Idle
            && self
                .started
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_ok();
        if claimed {
            return Ok(());
        }

        if state.is_active() {
            warn!(run_id = %self.run_id, "Run already executing batches; rejecting another start");
        }
        Err(DuplicatorError::InvalidTransition {
            from: if state == RunState::Idle {
                "fetching".to_string()
            } else {
                state.to_string()
            },
            event: RunStateEvent::Start.event_type().to_string(),
        })
    }

    /// Fail the run before execution began and notify subscribers
    fn abort(&self, collection_id: &CollectionId, err: DuplicatorError) -> DuplicatorError {
        error!(
            run_id = %self.run_id,
            collection_id = %collection_id,
            error = %err,
            "❌ RUN: Aborted before any write"
        );
        if !self.tracker.fail_if_idle(&err.to_string()) {
            warn!(
                run_id = %self.run_id,
                state = %self.tracker.state(),
                "Run state left unchanged; tracker was no longer idle"
            );
        }
        log_run_operation(
            "run",
            &self.run_id,
            collection_id.as_str(),
            "failed",
            Some(&err.to_string()),
        );
        self.publisher.publish(RunNotification::Aborted {
            run_id: self.run_id.clone(),
            error: err.to_string(),
        });
        err
    }
}
