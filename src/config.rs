//! # Duplicator Configuration
//!
//! Layered configuration for the duplication engine.
//!
//! Precedence (highest to lowest):
//! 1. Environment variables prefixed with `DUPLICATOR_` (e.g. `DUPLICATOR_BATCH_SIZE=40`)
//! 2. Config file (TOML), when one is given
//! 3. Default values
//!
//! ```rust
//! use creation_log_duplicator::config::DuplicatorConfig;
//!
//! let config = DuplicatorConfig::default();
//! assert_eq!(config.batch_size, 80);
//! assert_eq!(config.page_limit, 500);
//! assert_eq!(config.inter_batch_delay_ms, 5000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::debug;

use crate::constants::{
    CREATION_LOG_COLUMN_TYPE, DEFAULT_API_URL, DEFAULT_BATCH_SIZE, DEFAULT_INTER_BATCH_DELAY_MS,
    DEFAULT_MAX_PAGES, DEFAULT_PAGE_LIMIT, DEFAULT_REQUEST_TIMEOUT_MS, ENV_PREFIX, MAX_PAGE_LIMIT,
};
use crate::error::{DuplicatorError, DuplicatorResult};

/// What a finished run must satisfy to be reported as succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SuccessPolicy {
    /// Every batch was attempted, whether or not each one was accepted
    #[default]
    Attempted,
    /// Every batch was attempted and accepted
    Strict,
}

impl fmt::Display for SuccessPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attempted => write!(f, "attempted"),
            Self::Strict => write!(f, "strict"),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuplicatorConfig {
    /// GraphQL endpoint of the record store
    pub api_url: String,
    /// Value of the `Authorization` header, if the endpoint needs one
    pub api_token: Option<String>,
    /// Value of the `API-Version` header, if pinned
    pub api_version: Option<String>,
    /// Request timeout in milliseconds
    pub request_timeout_ms: u64,
    /// Items requested per page
    pub page_limit: u32,
    /// Maximum pages fetched before the run is aborted
    pub max_pages: usize,
    /// Write operations per composite mutation
    pub batch_size: usize,
    /// Pause between consecutive batches in milliseconds
    pub inter_batch_delay_ms: u64,
    /// Column type tag whose value is copied
    pub creation_log_type: String,
    /// Terminal state rule for runs with failed batches
    pub success_policy: SuccessPolicy,
}

impl Default for DuplicatorConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_token: None,
            api_version: None,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            page_limit: DEFAULT_PAGE_LIMIT,
            max_pages: DEFAULT_MAX_PAGES,
            batch_size: DEFAULT_BATCH_SIZE,
            inter_batch_delay_ms: DEFAULT_INTER_BATCH_DELAY_MS,
            creation_log_type: CREATION_LOG_COLUMN_TYPE.to_string(),
            success_policy: SuccessPolicy::default(),
        }
    }
}

impl DuplicatorConfig {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> DuplicatorResult<Self> {
        Self::build(path, true)
    }

    /// Load configuration from a specific file, ignoring the environment
    pub fn load_from_file(path: &Path) -> DuplicatorResult<Self> {
        Self::build(Some(path), false)
    }

    fn build(path: Option<&Path>, with_env: bool) -> DuplicatorResult<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            debug!("Loading config from: {}", path.display());
            builder = builder.add_source(config::File::from(path).required(true));
        }

        if with_env {
            builder = builder.add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .ignore_empty(true),
            );
        }

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;

        debug!(config = %config.sanitized(), "Loaded duplicator configuration");
        Ok(config)
    }

    /// Reject values the remote API or the engine cannot work with
    pub fn validate(&self) -> DuplicatorResult<()> {
        if self.api_url.trim().is_empty() {
            return Err(DuplicatorError::configuration("api_url must not be empty"));
        }
        if self.page_limit == 0 || self.page_limit > MAX_PAGE_LIMIT {
            return Err(DuplicatorError::configuration(format!(
                "page_limit must be between 1 and {MAX_PAGE_LIMIT}, got {}",
                self.page_limit
            )));
        }
        if self.max_pages == 0 {
            return Err(DuplicatorError::configuration(
                "max_pages must be greater than zero",
            ));
        }
        if self.batch_size == 0 {
            return Err(DuplicatorError::configuration(
                "batch_size must be greater than zero",
            ));
        }
        if self.creation_log_type.trim().is_empty() {
            return Err(DuplicatorError::configuration(
                "creation_log_type must not be empty",
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn inter_batch_delay(&self) -> Duration {
        Duration::from_millis(self.inter_batch_delay_ms)
    }

    /// JSON view of the configuration with the API token masked
    pub fn sanitized(&self) -> serde_json::Value {
        let mut value = serde_json::json!(self);
        if let Some(token) = value.get_mut("api_token") {
            if let serde_json::Value::String(s) = token {
                let chars: Vec<char> = s.chars().collect();
                let masked = if chars.len() > 4 {
                    let head: String = chars[..2].iter().collect();
                    let tail: String = chars[chars.len() - 2..].iter().collect();
                    format!("{head}***{tail}")
                } else {
                    "***".to_string()
                };
                *token = serde_json::Value::String(format!("[MASKED: {masked}]"));
            }
        }
        value
    }
}
