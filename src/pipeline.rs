//! Medication recommendation pipeline
//!
//! condition -> model draft -> [`extract_medications`] -> [`dedupe`] ->
//! [`InteractionReconciler`] -> one [`RecommendationResult`].

use crate::error::IntakeError;
use crate::extraction::{dedupe, extract_medications, MedicationMention, DEFAULT_PLACEHOLDERS};
use crate::interactions::{InteractionReconciler, SafetyReport};
use crate::llm::{complete_text, LlmRequest, LlmService};
use crate::prompts::{recommendation_prompt, RECOMMENDATION_SYSTEM_PROMPT};
use serde::Serialize;
use std::sync::Arc;

const RECOMMENDATION_TEMPERATURE: f32 = 0.3;
const RECOMMENDATION_MAX_TOKENS: u32 = 1500;

/// Everything one recommendation request produced
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationResult {
    /// The model's full advisory text
    #[serde(rename = "recommendations")]
    pub free_text: String,
    #[serde(rename = "recommended_medications")]
    pub extracted_medications: Vec<MedicationMention>,
    /// Present only when current medications were supplied
    #[serde(rename = "interactions", skip_serializing_if = "Option::is_none")]
    pub safety_report: Option<SafetyReport>,
}

impl RecommendationResult {
    pub fn medication_names(&self) -> Vec<String> {
        self.extracted_medications
            .iter()
            .map(|m| m.name.clone())
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Drop placeholders and case-insensitive repeats before reconciliation
    pub dedupe: bool,
    pub placeholders: Vec<String>,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            dedupe: true,
            placeholders: DEFAULT_PLACEHOLDERS.iter().map(ToString::to_string).collect(),
        }
    }
}

pub struct RecommendationPipeline {
    llm: Arc<dyn LlmService>,
    reconciler: InteractionReconciler,
    options: PipelineOptions,
}

impl RecommendationPipeline {
    pub fn new(llm: Arc<dyn LlmService>, reconciler: InteractionReconciler) -> Self {
        Self {
            llm,
            reconciler,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn recommend(
        &self,
        condition: &str,
        allergies: &[String],
        current_medications: &[String],
    ) -> Result<RecommendationResult, IntakeError> {
        let condition = condition.trim();
        if condition.is_empty() {
            return Err(IntakeError::invalid_input("Medical condition is required"));
        }
        let allergies = clean_list(allergies);
        let current_medications = clean_list(current_medications);

        tracing::info!(
            allergies = allergies.len(),
            current_medications = current_medications.len(),
            "Generating medication recommendations"
        );

        let request = LlmRequest::prompt(recommendation_prompt(
            condition,
            &allergies,
            &current_medications,
        ))
        .with_system(RECOMMENDATION_SYSTEM_PROMPT)
        .with_temperature(RECOMMENDATION_TEMPERATURE)
        .with_max_tokens(RECOMMENDATION_MAX_TOKENS);

        let free_text = complete_text(self.llm.as_ref(), &request).await?;

        let mut mentions = extract_medications(&free_text);
        if self.options.dedupe {
            let placeholders: Vec<&str> =
                self.options.placeholders.iter().map(String::as_str).collect();
            mentions = dedupe(mentions, &placeholders);
        }
        tracing::info!(
            medications = ?mentions.iter().map(|m| m.name.as_str()).collect::<Vec<_>>(),
            "Extracted recommended medications"
        );

        let safety_report = if current_medications.is_empty() {
            None
        } else {
            let candidates: Vec<String> = mentions.iter().map(|m| m.name.clone()).collect();
            Some(
                self.reconciler
                    .reconcile(&candidates, &current_medications)
                    .await,
            )
        };

        Ok(RecommendationResult {
            free_text,
            extracted_medications: mentions,
            safety_report,
        })
    }
}

/// Trim entries and drop blanks
fn clean_list(items: &[String]) -> Vec<String> {
    items
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
