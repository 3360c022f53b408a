//! Error taxonomy for the intake engine

use crate::llm::{LlmError, LlmErrorKind};
use crate::state_machine::TransitionError;
use thiserror::Error;

/// Fallback shown to the user when the model cannot be reached or says nothing
pub const COLLABORATOR_FALLBACK: &str = "I'm having trouble reaching the assistant service right now. \
     Please try again later or consult a healthcare professional.";

/// Errors surfaced by the public operations
#[derive(Debug, Clone, Error)]
pub enum IntakeError {
    /// Input rejected before any collaborator call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Missing credentials or transport failure
    #[error("Collaborator unavailable: {message}")]
    CollaboratorUnavailable { kind: LlmErrorKind, message: String },

    /// Call succeeded but returned nothing usable
    #[error("The model returned an empty response")]
    EmptyModelResponse,

    /// One interaction lookup failed. Recorded per pair, never returned by a batch.
    #[error("Interaction lookup failed for {drug_a} + {drug_b}: {message}")]
    LookupFailure {
        drug_a: String,
        drug_b: String,
        message: String,
    },

    /// Dialogue operation not allowed in the current state
    #[error(transparent)]
    Dialogue(#[from] TransitionError),
}

impl IntakeError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Soft failures: the host should show [`COLLABORATOR_FALLBACK`] and carry on
    pub fn is_collaborator_failure(&self) -> bool {
        matches!(
            self,
            Self::CollaboratorUnavailable { .. } | Self::EmptyModelResponse
        )
    }

    /// Human-readable description for the end user
    pub fn user_message(&self) -> String {
        if self.is_collaborator_failure() {
            COLLABORATOR_FALLBACK.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<LlmError> for IntakeError {
    fn from(e: LlmError) -> Self {
        Self::CollaboratorUnavailable {
            kind: e.kind,
            message: e.message,
        }
    }
}
