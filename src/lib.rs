//! Chiron - conversational health intake engine
//!
//! Library surface consumed by the `chiron` binary or any other host:
//!
//! - [`AssessmentDialogue`]: bounded follow-up questioning, then a structured assessment
//! - [`RecommendationPipeline`]: condition to medication draft, extraction and safety report
//! - [`InteractionReconciler`]: candidate medications against current ones
//! - [`analyze_symptoms`]: single-shot symptom analysis
//!
//! Model access and the interaction knowledge base are injected as trait
//! objects, so every operation runs against mocks in tests.

pub mod config;
pub mod dialogue;
pub mod error;
pub mod extraction;
pub mod interactions;
pub mod llm;
pub mod pipeline;
pub mod prompts;
pub mod state_machine;
pub mod symptoms;

#[cfg(test)]
mod testing;

pub use config::AppConfig;
pub use dialogue::{AssessmentDialogue, DialogueConfig, TurnOutcome};
pub use error::{IntakeError, COLLABORATOR_FALLBACK};
pub use extraction::{dedupe, extract_medications, MedicationMention};
pub use interactions::{
    InteractionAdvisor, InteractionDatabase, InteractionReconciler, InteractionTable,
    LlmAdvisor, PairCheck, ReconcileOptions, SafetyReport,
};
pub use llm::{LlmError, LlmService};
pub use pipeline::{PipelineOptions, RecommendationPipeline, RecommendationResult};
pub use symptoms::analyze_symptoms;
