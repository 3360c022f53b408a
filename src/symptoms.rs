//! Single-shot symptom analysis

use crate::error::IntakeError;
use crate::llm::{complete_text, LlmRequest, LlmService};
use crate::prompts::{symptom_analysis_prompt, SYMPTOM_ANALYSIS_SYSTEM_PROMPT};

const ANALYSIS_TEMPERATURE: f32 = 0.5;
const ANALYSIS_MAX_TOKENS: u32 = 1000;

/// Ask the model for possible conditions behind a free-text symptom description.
///
/// Returns the model's markdown unchanged apart from trimming.
pub async fn analyze_symptoms(llm: &dyn LlmService, symptoms: &str) -> Result<String, IntakeError> {
    let symptoms = symptoms.trim();
    if symptoms.is_empty() {
        return Err(IntakeError::invalid_input("Please describe your symptoms"));
    }

    let request = LlmRequest::prompt(symptom_analysis_prompt(symptoms))
        .with_system(SYMPTOM_ANALYSIS_SYSTEM_PROMPT)
        .with_temperature(ANALYSIS_TEMPERATURE)
        .with_max_tokens(ANALYSIS_MAX_TOKENS);

    let analysis = complete_text(llm, &request).await?;
    tracing::info!(chars = analysis.len(), "Symptom analysis completed");
    Ok(analysis)
}
