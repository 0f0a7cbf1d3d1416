//! Agent loop state machine.
//!
//! Transition function `T: State × Event → Result<State>`:
//!
//! ```text
//! Thinking  → ToolCall   (on: ToolSelected)
//! Thinking  → Thinking   (on: Rejected)       malformed controller output
//! Thinking  → Answering  (on: Finish | StepLimit)
//! ToolCall  → Observing  (on: ToolReturned)
//! Observing → Thinking   (on: Continue)
//! Observing → Answering  (on: StepLimit)
//! ```
//!
//! `Answering` is terminal: every event from it is an invalid transition.

use serde::Serialize;

use crate::error::{RagError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AgentState {
    /// Waiting on the controller's next response.
    Thinking,
    /// A tool has been selected and is running.
    ToolCall,
    /// The tool's observation is available.
    Observing,
    /// Terminal.
    Answering,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateEvent {
    ToolSelected,
    ToolReturned,
    Continue,
    Rejected,
    Finish,
    StepLimit,
}

impl AgentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Answering)
    }

    pub fn transition(&self, event: StateEvent) -> Result<AgentState> {
        use AgentState::*;
        use StateEvent::*;

        let next = match (self, event) {
            (Thinking, ToolSelected) => ToolCall,
            (Thinking, Rejected) => Thinking,
            (Thinking, Finish) | (Thinking, StepLimit) => Answering,

            (ToolCall, ToolReturned) => Observing,

            (Observing, Continue) => Thinking,
            (Observing, StepLimit) => Answering,

            (from, event) => {
                return Err(RagError::InvalidTransition {
                    from: format!("{:?}", from),
                    event: format!("{:?}", event),
                });
            }
        };

        Ok(next)
    }

    pub fn valid_events(&self) -> Vec<StateEvent> {
        use AgentState::*;
        use StateEvent::*;

        match self {
            Thinking => vec![ToolSelected, Rejected, Finish, StepLimit],
            ToolCall => vec![ToolReturned],
            Observing => vec![Continue, StepLimit],
            Answering => vec![],
        }
    }
}
