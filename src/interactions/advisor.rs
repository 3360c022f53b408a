//! Advisory interaction lookup backed by the generative collaborator

use super::InteractionAdvisor;
use crate::llm::{LlmError, LlmRequest, LlmService};
use crate::prompts::{interaction_prompt, INTERACTION_ADVISOR_SYSTEM_PROMPT};
use async_trait::async_trait;
use std::sync::Arc;

const ADVISOR_TEMPERATURE: f32 = 0.3;
const ADVISOR_MAX_TOKENS: u32 = 500;

/// Asks the model about a drug pair and returns its prose verbatim
pub struct LlmAdvisor {
    llm: Arc<dyn LlmService>,
}

impl LlmAdvisor {
    pub fn new(llm: Arc<dyn LlmService>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl InteractionAdvisor for LlmAdvisor {
    async fn check_interaction(&self, drug_a: &str, drug_b: &str) -> Result<String, LlmError> {
        let request = LlmRequest::prompt(interaction_prompt(drug_a, drug_b))
            .with_system(INTERACTION_ADVISOR_SYSTEM_PROMPT)
            .with_temperature(ADVISOR_TEMPERATURE)
            .with_max_tokens(ADVISOR_MAX_TOKENS);

        let response = self.llm.complete(&request).await?;
        response
            .non_empty_text()
            .map(str::to_string)
            .ok_or_else(|| LlmError::unknown("Empty advisory response"))
    }
}
