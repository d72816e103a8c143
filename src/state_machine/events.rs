use serde::{Deserialize, Serialize};

/// Events that can trigger run state transitions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum RunStateEvent {
    /// Begin executing the batch plan
    Start,
    /// Every batch was attempted and the success policy is satisfied
    Complete,
    /// Run aborted or the success policy was not met
    Fail(String),
}

impl RunStateEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Complete => "complete",
            Self::Fail(_) => "fail",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }
}
