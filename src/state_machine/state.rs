//! Dialogue state types

use crate::llm::{LlmMessage, MessageRole};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Token the model emits once it has enough information for an assessment
pub const READINESS_MARKER: &str = "[ASSESSMENT_READY]";

/// User utterance that ends the conversation immediately
pub const EXIT_SENTINEL: &str = "exit";

/// Follow-up questions asked before an assessment is forced
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// Check an utterance against the exit sentinel (case-insensitive)
pub fn is_exit(utterance: &str) -> bool {
    utterance.trim().eq_ignore_ascii_case(EXIT_SENTINEL)
}

/// One utterance in the conversation. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    role: MessageRole,
    text: String,
}

impl ConversationTurn {
    pub fn new(role: MessageRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    pub fn role(&self) -> MessageRole {
        self.role
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only, ordered conversation history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<ConversationTurn>);

impl ConversationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, role: MessageRole, text: impl Into<String>) {
        self.0.push(ConversationTurn::new(role, text));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationTurn> {
        self.0.last()
    }

    /// Replay the history as model messages, in order
    pub fn to_messages(&self) -> Vec<LlmMessage> {
        self.0
            .iter()
            .map(|turn| LlmMessage {
                role: turn.role,
                content: turn.text.clone(),
            })
            .collect()
    }
}

/// Why a dialogue stopped before reaching readiness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// The model call failed or came back empty
    CollaboratorUnavailable,
    /// The user typed the exit sentinel
    UserExit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CollaboratorUnavailable => write!(f, "collaborator_unavailable"),
            Self::UserExit => write!(f, "user_exit"),
        }
    }
}

/// Where the dialogue is
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialoguePhase {
    /// Waiting for the opening utterance
    #[default]
    New,

    /// Next clarification requested from the model
    Gathering,

    /// A follow-up question is with the user
    AwaitingAnswer { question: String },

    /// The model is ready but asked one last question first
    AwaitingFinalAnswer { question: String },

    /// Enough information gathered (or turn budget spent)
    ReadyForAssessment,

    /// Stopped early; absorbing
    Terminated { reason: TerminationReason },

    /// Assessment produced; absorbing
    Assessed { assessment: String },
}

impl DialoguePhase {
    /// No further turns are accepted
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialoguePhase::Terminated { .. } | DialoguePhase::Assessed { .. }
        )
    }

    /// An assessment may be requested from here
    pub fn can_assess(&self) -> bool {
        matches!(
            self,
            DialoguePhase::ReadyForAssessment
                | DialoguePhase::Terminated {
                    reason: TerminationReason::CollaboratorUnavailable
                }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            DialoguePhase::New => "new",
            DialoguePhase::Gathering => "gathering",
            DialoguePhase::AwaitingAnswer { .. } => "awaiting_answer",
            DialoguePhase::AwaitingFinalAnswer { .. } => "awaiting_final_answer",
            DialoguePhase::ReadyForAssessment => "ready_for_assessment",
            DialoguePhase::Terminated { .. } => "terminated",
            DialoguePhase::Assessed { .. } => "assessed",
        }
    }
}

/// Everything one session knows. Owned by exactly one dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogueState {
    pub history: ConversationHistory,
    pub turns_asked: u32,
    pub max_turns: u32,
    pub phase: DialoguePhase,
}

impl DialogueState {
    pub fn new(max_turns: u32) -> Self {
        Self {
            history: ConversationHistory::new(),
            turns_asked: 0,
            max_turns,
            phase: DialoguePhase::New,
        }
    }

    pub fn ready_for_assessment(&self) -> bool {
        matches!(self.phase, DialoguePhase::ReadyForAssessment)
    }

    pub fn budget_spent(&self) -> bool {
        self.turns_asked >= self.max_turns
    }
}

impl Default for DialogueState {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_TURNS)
    }
}

/// Immutable per-session context
#[derive(Debug, Clone)]
pub struct DialogueContext {
    pub session_id: String,
}

impl DialogueContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}
