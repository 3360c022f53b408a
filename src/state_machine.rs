//! Assessment dialogue state machine
//!
//! Elm-style: a pure transition function over (state, event) that returns
//! the next state plus the effects the runtime must carry out.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{
    is_exit, ConversationHistory, ConversationTurn, DialogueContext, DialoguePhase,
    DialogueState, TerminationReason, DEFAULT_MAX_TURNS, EXIT_SENTINEL, READINESS_MARKER,
};
pub use transition::{transition, TransitionError, TransitionResult};
