use serde::{Deserialize, Serialize};

use crate::orchestration::types::RunReport;

/// Notifications a presentation layer can render while a run progresses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunNotification {
    /// Batch execution is starting
    Started { run_id: String, total: usize, batch_count: usize },
    /// A batch was accepted by the remote store
    BatchCompleted {
        batch_number: usize,
        processed: usize,
        total: usize,
    },
    /// A batch call failed; the run continues with the next batch
    BatchFailed { batch_number: usize, error: String },
    /// Batch execution ended; `report.completion` tells whether every batch was attempted
    Finished { report: RunReport },
    /// The run ended early
    Aborted { run_id: String, error: String },
}

impl RunNotification {
    /// Stable name for logging and event routing
    pub fn name(&self) -> &'static str {
        match self {
            Self::Started { .. } => "run.started",
            Self::BatchCompleted { .. } => "run.batch_completed",
            Self::BatchFailed { .. } => "run.batch_failed",
            Self::Finished { .. } => "run.finished",
            Self::Aborted { .. } => "run.aborted",
        }
    }

    /// Check if no further notifications follow for this run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Aborted { .. })
    }
}
