//! Pure state transition function
//!
//! Given the same state and event this always produces the same result and
//! performs no I/O. The runtime in [`crate::dialogue`] executes the effects.

use super::state::{is_exit, DialogueContext, DialoguePhase, DialogueState, READINESS_MARKER};
use super::{Effect, Event, TerminationReason};
use crate::llm::MessageRole;
use thiserror::Error;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: DialogueState,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: DialogueState) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }
}

/// Errors that can occur during transition
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("The opening message must describe your symptoms")]
    EmptyUtterance,
    #[error("Still waiting for the assistant, cannot accept a message yet")]
    AwaitingCollaborator,
    #[error("Enough information has been gathered; request the assessment instead")]
    ReadyForAssessment,
    #[error("The conversation has ended ({0})")]
    DialogueClosed(TerminationReason),
    #[error("The assessment has already been produced")]
    AlreadyAssessed,
    #[error("Cannot produce an assessment: {0}")]
    NotReady(&'static str),
    #[error("Invalid transition: {0}")]
    InvalidTransition(String),
}

/// Pure transition function
pub fn transition(
    state: &DialogueState,
    _context: &DialogueContext,
    event: Event,
) -> Result<TransitionResult, TransitionError> {
    match (&state.phase, event) {
        // ============================================================
        // Opening utterance
        // ============================================================
        (DialoguePhase::New, Event::UserUtterance { text }) => {
            if text.trim().is_empty() {
                return Err(TransitionError::EmptyUtterance);
            }
            if is_exit(&text) {
                return Ok(terminate(state.clone(), TerminationReason::UserExit));
            }

            let mut next = state.clone();
            next.history.push(MessageRole::User, text);
            if next.budget_spent() {
                return Ok(ready(next));
            }
            next.phase = DialoguePhase::Gathering;
            Ok(TransitionResult::new(next).with_effect(Effect::RequestClarification))
        }

        // ============================================================
        // Model replies while gathering
        // ============================================================
        (DialoguePhase::Gathering, Event::ClarificationReceived { text }) => {
            Ok(apply_clarification(state, &text))
        }

        (DialoguePhase::Gathering, Event::ClarificationFailed { .. }) => Ok(terminate(
            state.clone(),
            TerminationReason::CollaboratorUnavailable,
        )),

        (DialoguePhase::Gathering, Event::UserUtterance { .. }) => {
            Err(TransitionError::AwaitingCollaborator)
        }

        // ============================================================
        // User replies
        // ============================================================
        (DialoguePhase::AwaitingAnswer { .. }, Event::UserUtterance { text }) => {
            if is_exit(&text) {
                return Ok(terminate(state.clone(), TerminationReason::UserExit));
            }

            let mut next = state.clone();
            next.history.push(MessageRole::User, text);
            next.turns_asked += 1;
            if next.budget_spent() {
                return Ok(ready(next));
            }
            next.phase = DialoguePhase::Gathering;
            Ok(TransitionResult::new(next).with_effect(Effect::RequestClarification))
        }

        (DialoguePhase::AwaitingFinalAnswer { .. }, Event::UserUtterance { text }) => {
            if is_exit(&text) {
                return Ok(terminate(state.clone(), TerminationReason::UserExit));
            }

            let mut next = state.clone();
            next.history.push(MessageRole::User, text);
            Ok(ready(next))
        }

        // ============================================================
        // Assessment
        // ============================================================
        (phase, Event::AssessmentRequested) if phase.can_assess() => {
            Ok(TransitionResult::new(state.clone()).with_effect(Effect::RequestAssessment))
        }

        (phase, Event::AssessmentReceived { text }) if phase.can_assess() => {
            let mut next = state.clone();
            next.phase = DialoguePhase::Assessed {
                assessment: text.clone(),
            };
            Ok(TransitionResult::new(next).with_effect(Effect::DeliverAssessment { assessment: text }))
        }

        (DialoguePhase::Terminated { reason }, Event::AssessmentRequested) => {
            debug_assert_eq!(*reason, TerminationReason::UserExit);
            Err(TransitionError::NotReady("the user ended the conversation"))
        }

        (DialoguePhase::Assessed { .. }, Event::AssessmentRequested) => {
            Err(TransitionError::AlreadyAssessed)
        }

        (_, Event::AssessmentRequested) => {
            Err(TransitionError::NotReady("information is still being gathered"))
        }

        // ============================================================
        // Absorbing states reject further turns
        // ============================================================
        (DialoguePhase::ReadyForAssessment, Event::UserUtterance { .. }) => {
            Err(TransitionError::ReadyForAssessment)
        }

        (DialoguePhase::Terminated { reason }, Event::UserUtterance { .. }) => {
            Err(TransitionError::DialogueClosed(*reason))
        }

        (DialoguePhase::Assessed { .. }, Event::UserUtterance { .. }) => {
            Err(TransitionError::AlreadyAssessed)
        }

        (phase, event) => Err(TransitionError::InvalidTransition(format!(
            "{event:?} in {}",
            phase.name()
        ))),
    }
}

/// Interpret one clarification from the model
fn apply_clarification(state: &DialogueState, text: &str) -> TransitionResult {
    let mut next = state.clone();

    if text.contains(READINESS_MARKER) {
        let remainder = text.replace(READINESS_MARKER, "");
        let question = remainder.trim();
        if question.is_empty() {
            return ready(next);
        }
        next.history.push(MessageRole::Assistant, question);
        next.phase = DialoguePhase::AwaitingFinalAnswer {
            question: question.to_string(),
        };
        return TransitionResult::new(next).with_effect(Effect::ask(question));
    }

    let question = text.trim();
    if question.is_empty() {
        return terminate(next, TerminationReason::CollaboratorUnavailable);
    }

    next.history.push(MessageRole::Assistant, question);
    next.phase = DialoguePhase::AwaitingAnswer {
        question: question.to_string(),
    };
    TransitionResult::new(next).with_effect(Effect::ask(question))
}

fn ready(mut state: DialogueState) -> TransitionResult {
    state.phase = DialoguePhase::ReadyForAssessment;
    TransitionResult::new(state).with_effect(Effect::NotifyReady)
}

fn terminate(mut state: DialogueState, reason: TerminationReason) -> TransitionResult {
    state.phase = DialoguePhase::Terminated { reason };
    TransitionResult::new(state).with_effect(Effect::terminated(reason))
}
