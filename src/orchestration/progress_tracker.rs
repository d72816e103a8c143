//! # Progress Tracker
//!
//! Run-wide counters read by the presentation layer while the batch executor
//! writes them. Each field is an atomic; readers get an eventually consistent
//! snapshot, never a torn individual value.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU8, AtomicUsize, Ordering};
use tracing::debug;

use crate::error::DuplicatorResult;
use crate::state_machine::{RunState, RunStateEvent, RunStateMachine};

/// Point-in-time view of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunProgress {
    pub processed_count: usize,
    pub total_count: usize,
    pub state: RunState,
}

impl RunProgress {
    /// Completed share in the range 0.0..=1.0; an empty run counts as complete
    pub fn fraction(&self) -> f64 {
        if self.total_count == 0 {
            return if self.state.is_terminal() { 1.0 } else { 0.0 };
        }
        self.processed_count as f64 / self.total_count as f64
    }

    pub fn percent(&self) -> u8 {
        (self.fraction() * 100.0).round().clamp(0.0, 100.0) as u8
    }
}

/// Single-writer progress holder for one run
#[derive(Debug, Default)]
pub struct ProgressTracker {
    processed: AtomicUsize,
    total: AtomicUsize,
    state: AtomicU8,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> RunProgress {
        RunProgress {
            processed_count: self.processed.load(Ordering::Acquire),
            total_count: self.total.load(Ordering::Acquire),
            state: self.state(),
        }
    }

    pub fn state(&self) -> RunState {
        RunState::from(self.state.load(Ordering::Acquire))
    }

    /// Idle -> Running with the number of writes the run will attempt
    pub fn start(&self, total: usize) -> DuplicatorResult<RunState> {
        RunStateMachine::determine_target_state(self.state(), &RunStateEvent::Start)?;
        self.total.store(total, Ordering::Release);
        self.processed.store(0, Ordering::Release);
        self.transition(&RunStateEvent::Start)
    }

    /// Add `count` accepted writes, returning the new processed total
    ///
    /// The count never exceeds the total announced in [`start`](Self::start).
    pub fn record_processed(&self, count: usize) -> usize {
        let total = self.total.load(Ordering::Acquire);
        let mut current = self.processed.load(Ordering::Acquire);
        loop {
            let next = current.saturating_add(count).min(total);
            match self.processed.compare_exchange(
                current,
                next,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    /// Idle -> Failed for a run that ended before execution began
    ///
    /// Returns `false` and leaves the state alone if the tracker is no longer
    /// idle.
    pub fn fail_if_idle(&self, reason: &str) -> bool {
        let applied = self
            .state
            .compare_exchange(
                RunState::Idle as u8,
                RunState::Failed as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok();
        if applied {
            debug!(from = %RunState::Idle, to = %RunState::Failed, reason = reason, "Run state transition");
        }
        applied
    }

    /// Apply a lifecycle event, rejecting anything the state machine forbids
    pub fn transition(&self, event: &RunStateEvent) -> DuplicatorResult<RunState> {
        let mut current = self.state();
        loop {
            let target = RunStateMachine::determine_target_state(current, event)?;
            match self.state.compare_exchange(
                current as u8,
                target as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            ) {
                Ok(_) => {
                    debug!(
                        from = %current,
                        to = %target,
                        event = event.event_type(),
                        reason = event.error_message(),
                        "Run state transition"
                    );
                    return Ok(target);
                }
                Err(actual) => current = RunState::from(actual),
            }
        }
    }
}
