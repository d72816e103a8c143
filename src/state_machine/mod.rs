// State machine module for duplication runs
//
// A run moves Idle -> Running -> {Succeeded, Failed} exactly once. Terminal
// states never restart.

pub mod events;
pub mod run_state_machine;
pub mod states;

pub use events::RunStateEvent;
pub use run_state_machine::RunStateMachine;
pub use states::RunState;
