//! Assessment dialogue runtime
//!
//! Feeds events through the pure [`transition`] function and carries out
//! the effects it returns: model calls for clarifications and the final
//! assessment, and handing questions back to the caller. Every model call is
//! awaited before the next event is processed.

use crate::error::IntakeError;
use crate::llm::{complete_text, LlmRequest, LlmService};
use crate::prompts::{clarification_system_prompt, ASSESSMENT_SYSTEM_PROMPT};
use crate::state_machine::{
    transition, ConversationHistory, DialogueContext, DialoguePhase, DialogueState, Effect, Event,
    TerminationReason, TransitionError, DEFAULT_MAX_TURNS,
};
use serde::Serialize;
use std::sync::Arc;

const CLARIFICATION_TEMPERATURE: f32 = 0.4;
const CLARIFICATION_MAX_TOKENS: u32 = 150;
const ASSESSMENT_TEMPERATURE: f32 = 0.3;
const ASSESSMENT_MAX_TOKENS: u32 = 800;

/// What the caller should do after a turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnOutcome {
    /// Show this question and pass the user's answer to [`AssessmentDialogue::reply`]
    Ask { question: String },
    /// Call [`AssessmentDialogue::assess`]
    ReadyForAssessment,
    /// The dialogue stopped. After [`TerminationReason::CollaboratorUnavailable`]
    /// an assessment can still be requested from the history so far.
    Terminated { reason: TerminationReason },
    /// The final assessment, exactly as the model wrote it
    Assessed { assessment: String },
}

#[derive(Debug, Clone, Copy)]
pub struct DialogueConfig {
    pub max_turns: u32,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

/// One intake conversation. Owns its state; never shared between sessions.
pub struct AssessmentDialogue {
    context: DialogueContext,
    state: DialogueState,
    llm: Arc<dyn LlmService>,
}

impl AssessmentDialogue {
    pub fn new(llm: Arc<dyn LlmService>, config: DialogueConfig) -> Self {
        let context = DialogueContext::new(uuid::Uuid::new_v4().to_string());
        tracing::info!(session_id = %context.session_id, max_turns = config.max_turns, "Starting dialogue");
        Self {
            context,
            state: DialogueState::new(config.max_turns),
            llm,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.state.history
    }

    pub fn phase(&self) -> &DialoguePhase {
        &self.state.phase
    }

    /// Open the conversation with the user's first description of the problem.
    pub async fn start(&mut self, utterance: &str) -> Result<TurnOutcome, IntakeError> {
        if utterance.trim().is_empty() {
            return Err(IntakeError::invalid_input(
                "Please describe your symptoms to start the assessment",
            ));
        }
        if !matches!(self.state.phase, DialoguePhase::New) {
            return Err(TransitionError::InvalidTransition(
                "dialogue already started".to_string(),
            )
            .into());
        }
        self.process(Event::utterance(utterance)).await
    }

    /// Answer the last question.
    pub async fn reply(&mut self, utterance: &str) -> Result<TurnOutcome, IntakeError> {
        if matches!(self.state.phase, DialoguePhase::New) {
            return Err(TransitionError::InvalidTransition(
                "dialogue has not started".to_string(),
            )
            .into());
        }
        self.process(Event::utterance(utterance)).await
    }

    /// Produce the final assessment from the whole history.
    ///
    /// Allowed once the dialogue is ready, or after it stopped because the
    /// model was unavailable. On failure the state is left as it was.
    pub async fn assess(&mut self) -> Result<String, IntakeError> {
        match self.process(Event::AssessmentRequested).await? {
            TurnOutcome::Assessed { assessment } => {
                tracing::info!(
                    session_id = %self.context.session_id,
                    turns = self.state.history.len(),
                    "Assessment produced"
                );
                Ok(assessment)
            }
            other => Err(TransitionError::InvalidTransition(format!(
                "assessment request ended with {other:?}"
            ))
            .into()),
        }
    }

    /// Run an event and every event its effects generate, until the dialogue
    /// needs the caller again.
    async fn process(&mut self, event: Event) -> Result<TurnOutcome, IntakeError> {
        let mut pending = vec![event];
        let mut outcome = None;

        while let Some(current) = pending.pop() {
            let effects = self.apply(current)?;
            for effect in effects {
                match effect {
                    Effect::RequestClarification => {
                        pending.push(self.request_clarification().await);
                    }
                    Effect::AskUser { question } => {
                        outcome = Some(TurnOutcome::Ask { question });
                    }
                    Effect::NotifyReady => outcome = Some(TurnOutcome::ReadyForAssessment),
                    Effect::NotifyTerminated { reason } => {
                        outcome = Some(TurnOutcome::Terminated { reason });
                    }
                    Effect::RequestAssessment => {
                        // a failed call leaves the state as it was
                        let text = self.request_assessment().await?;
                        pending.push(Event::AssessmentReceived { text });
                    }
                    Effect::DeliverAssessment { assessment } => {
                        outcome = Some(TurnOutcome::Assessed { assessment });
                    }
                }
            }
        }

        outcome.ok_or_else(|| {
            TransitionError::InvalidTransition(format!(
                "turn ended without an outcome in {}",
                self.state.phase.name()
            ))
            .into()
        })
    }

    /// Pure transition, then commit the new state
    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let from = self.state.phase.name();
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;

        if from != self.state.phase.name() {
            tracing::debug!(
                session_id = %self.context.session_id,
                from,
                to = self.state.phase.name(),
                turns_asked = self.state.turns_asked,
                "Dialogue transition"
            );
        }
        Ok(result.effects)
    }

    /// Full history under the assessment instruction. Blank output is an
    /// error; anything else is returned untouched.
    async fn request_assessment(&self) -> Result<String, IntakeError> {
        let request = LlmRequest::new(self.state.history.to_messages())
            .with_system(ASSESSMENT_SYSTEM_PROMPT)
            .with_temperature(ASSESSMENT_TEMPERATURE)
            .with_max_tokens(ASSESSMENT_MAX_TOKENS);

        let result = match self.llm.complete(&request).await {
            Ok(response) if response.non_empty_text().is_some() => Ok(response.text),
            Ok(_) => Err(IntakeError::EmptyModelResponse),
            Err(e) => Err(IntakeError::from(e)),
        };
        result.inspect_err(|e| {
            tracing::error!(session_id = %self.context.session_id, error = %e, "Assessment failed");
        })
    }

    /// Replay the history and turn the model's answer into an event
    async fn request_clarification(&self) -> Event {
        let request = LlmRequest::new(self.state.history.to_messages())
            .with_system(clarification_system_prompt())
            .with_temperature(CLARIFICATION_TEMPERATURE)
            .with_max_tokens(CLARIFICATION_MAX_TOKENS);

        match complete_text(self.llm.as_ref(), &request).await {
            Ok(text) => {
                tracing::debug!(
                    session_id = %self.context.session_id,
                    preview = %preview(&text),
                    "Clarification received"
                );
                Event::ClarificationReceived { text }
            }
            Err(e) => {
                tracing::warn!(
                    session_id = %self.context.session_id,
                    turns_asked = self.state.turns_asked,
                    error = %e,
                    "Clarification unavailable, ending dialogue"
                );
                Event::ClarificationFailed {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// First line of model output, cut for logging
fn preview(text: &str) -> String {
    const MAX_CHARS: usize = 80;
    let line = text.lines().next().unwrap_or_default();
    let mut out: String = line.chars().take(MAX_CHARS).collect();
    if out.len() < text.len() {
        out.push_str("...");
    }
    out
}
