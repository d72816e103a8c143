use super::{events::RunStateEvent, states::RunState};
use crate::error::{DuplicatorError, DuplicatorResult};

/// Pure transition table for run lifecycle
pub struct RunStateMachine;

impl RunStateMachine {
    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        current_state: RunState,
        event: &RunStateEvent,
    ) -> DuplicatorResult<RunState> {
        let target = match (current_state, event) {
            (RunState::Idle, RunStateEvent::Start) => RunState::Running,
            (RunState::Running, RunStateEvent::Complete) => RunState::Succeeded,

            // A run may abort before its first batch (fetch failure, cancellation)
            (RunState::Idle, RunStateEvent::Fail(_)) => RunState::Failed,
            (RunState::Running, RunStateEvent::Fail(_)) => RunState::Failed,

            (from_state, _) => {
                return Err(DuplicatorError::InvalidTransition {
                    from: from_state.to_string(),
                    event: event.event_type().to_string(),
                })
            }
        };

        Ok(target)
    }
}
