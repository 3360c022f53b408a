//! Effects produced by state transitions

use super::state::TerminationReason;

/// Effects to be executed after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Replay the history to the model and ask for the next clarification
    RequestClarification,

    /// Surface a question to the user and wait for the reply
    AskUser { question: String },

    /// Tell the caller the dialogue can move to assessment
    NotifyReady,

    /// Tell the caller the dialogue stopped
    NotifyTerminated { reason: TerminationReason },

    /// Send the history with the assessment instruction to the model
    RequestAssessment,

    /// Hand the finished assessment to the caller
    DeliverAssessment { assessment: String },
}

impl Effect {
    pub fn ask(question: impl Into<String>) -> Self {
        Effect::AskUser {
            question: question.into(),
        }
    }

    pub fn terminated(reason: TerminationReason) -> Self {
        Effect::NotifyTerminated { reason }
    }

    /// Requires a model round trip
    pub fn is_collaborator_call(&self) -> bool {
        matches!(self, Effect::RequestClarification | Effect::RequestAssessment)
    }
}
