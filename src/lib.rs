#![allow(clippy::doc_markdown)] // Allow technical terms like GraphQL in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Creation Log Duplicator
//!
//! Copies the value of the creation-log column on every sub-record of a
//! collection into a column the caller picks.
//!
//! ## Overview
//!
//! Collections can hold more records than one API call returns, and the
//! remote store rate-limits writes. The engine therefore:
//!
//! 1. walks the collection with cursor pagination until the cursor runs out,
//! 2. derives one pending write per sub-record with a creation-log value,
//! 3. partitions the writes into batches under the per-call operation ceiling,
//! 4. sends the batches one at a time with a pause between them,
//! 5. tracks progress and keeps going when an individual batch fails.
//!
//! ## Module Organization
//!
//! - [`models`] - Records, sub-records, column values and pending writes
//! - [`client`] - The remote record store seam and its GraphQL implementation
//! - [`orchestration`] - Fetch, extract, plan and execute stages plus the run entry point
//! - [`state_machine`] - Run lifecycle states and transitions
//! - [`events`] - Run notifications for presentation layers
//! - [`config`] - Layered configuration
//! - [`error`] - Structured error handling
//! - [`logging`] - Structured logging setup
//!
//! ## Testing
//!
//! ```bash
//! cargo test --lib    # Unit tests
//! cargo test          # Unit, integration and property tests
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod state_machine;

pub use client::{GraphqlRecordStore, ItemOutcome, ItemsPage, MutationResult, RecordStoreApi};
pub use config::{DuplicatorConfig, SuccessPolicy};
pub use error::{DuplicatorError, DuplicatorResult};
pub use events::{EventPublisher, PublishedNotification, RunNotification};
pub use models::{
    Batch, CollectionId, ColumnId, ColumnOption, ColumnValue, ItemId, Record, SubRecord,
    WriteDescriptor,
};
pub use orchestration::{
    available_columns, BatchExecutor, BatchPlanner, CancellationFlag, Completion,
    CreationLogDuplicator, CreationLogExtractor, FixedDelayThrottle, PageFetcher, Paginator,
    ProgressTracker, RunProgress, RunReport, Throttle,
};
pub use state_machine::RunState;
