//! Generative collaborator abstraction
//!
//! Everything that talks to a language model goes through [`LlmService`].
//! Handles are constructed once by the host and injected; nothing in the
//! engine builds its own client.

mod error;
mod groq;
mod types;

#[cfg(test)]
mod proptests;

pub use error::{LlmError, LlmErrorKind};
pub use groq::{GroqService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use types::*;

use crate::error::IntakeError;
use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for LLM providers
#[async_trait]
pub trait LlmService: Send + Sync {
    /// Make a completion request. Stateless: the request carries all context.
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError>;

    /// Get the model ID
    fn model_id(&self) -> &str;
}

/// Run a request and return its trimmed text.
///
/// Transport failures become [`IntakeError::CollaboratorUnavailable`], a
/// successful call with blank output becomes [`IntakeError::EmptyModelResponse`].
pub async fn complete_text(
    service: &dyn LlmService,
    request: &LlmRequest,
) -> Result<String, IntakeError> {
    let response = service.complete(request).await?;
    response
        .non_empty_text()
        .map(str::to_string)
        .ok_or(IntakeError::EmptyModelResponse)
}

/// Logging wrapper for LLM services
pub struct LoggingService {
    inner: Arc<dyn LlmService>,
    model_id: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn LlmService>) -> Self {
        let model_id = inner.model_id().to_string();
        Self { inner, model_id }
    }
}

#[async_trait]
impl LlmService for LoggingService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        let start = std::time::Instant::now();
        let result = self.inner.complete(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(response) => {
                tracing::info!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    messages = request.messages.len(),
                    input_tokens = response.usage.input_tokens,
                    output_tokens = response.usage.output_tokens,
                    "LLM request completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    model = %self.model_id,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    transient = e.kind.is_transient(),
                    "LLM request failed"
                );
            }
        }

        result
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

/// Stand-in used when no credentials are configured.
///
/// Every call fails with an auth error, so callers see a collaborator
/// failure instead of the host refusing to start.
pub struct UnconfiguredService {
    reason: String,
}

impl UnconfiguredService {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl LlmService for UnconfiguredService {
    async fn complete(&self, _request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        Err(LlmError::auth(self.reason.clone()))
    }

    fn model_id(&self) -> &str {
        "unconfigured"
    }
}
