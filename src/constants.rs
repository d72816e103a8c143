//! # Constants
//!
//! Defaults for the remote record-store API limits and run throttling.

/// Items requested per page query; the remote API rejects larger pages
pub const DEFAULT_PAGE_LIMIT: u32 = 500;

/// Largest page size the remote API accepts
pub const MAX_PAGE_LIMIT: u32 = 500;

/// Pagination cap; a backend that never returns a null cursor is aborted here
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Operations per composite mutation, kept under the per-call complexity ceiling
pub const DEFAULT_BATCH_SIZE: usize = 80;

/// Pause between consecutive batches
pub const DEFAULT_INTER_BATCH_DELAY_MS: u64 = 5_000;

/// Per-request HTTP timeout
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Default GraphQL endpoint
pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";

/// Column type tag whose value is duplicated
pub const CREATION_LOG_COLUMN_TYPE: &str = "creation_log";

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "DUPLICATOR";

/// Capacity of the run notification channel
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;
