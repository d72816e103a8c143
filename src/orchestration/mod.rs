//! # Duplication Engine
//!
//! The fetch-extract-batch-write-report cycle.
//!
//! ## Core Components
//!
//! - **PageFetcher / Paginator**: Cursor-paginated walk of a collection into the full record set
//! - **CreationLogExtractor**: Turns sub-records with a creation-log value into pending writes
//! - **BatchPlanner**: Contiguous, order-preserving partition of writes into bounded batches
//! - **BatchExecutor**: Serial, throttled batch mutations tolerant of individual batch failures
//! - **ProgressTracker**: Processed/total counters and run state readable while a run executes
//! - **CreationLogDuplicator**: Entry point wiring the stages together for one run
//!
//! Everything runs on one logical flow of control. The only suspension points
//! are page fetches, batch mutations and inter-batch delays.

pub mod batch_executor;
pub mod batch_planner;
pub mod cancellation;
pub mod creation_log_extractor;
pub mod duplicator;
pub mod page_fetcher;
pub mod progress_tracker;
pub mod throttle;
pub mod types;

pub use batch_executor::BatchExecutor;
pub use batch_planner::BatchPlanner;
pub use cancellation::CancellationFlag;
pub use creation_log_extractor::{available_columns, CreationLogExtractor};
pub use duplicator::CreationLogDuplicator;
pub use page_fetcher::{PageFetcher, Paginator};
pub use progress_tracker::{ProgressTracker, RunProgress};
pub use throttle::{FixedDelayThrottle, Throttle};
pub use types::{BatchOutcome, BatchStatus, Completion, ExecutionOutcome, RunReport};
