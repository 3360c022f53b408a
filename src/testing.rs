//! Mock collaborators for testing
//!
//! These mocks let the engine be exercised without network or a real
//! knowledge base. They record every call so tests can assert on counts.

use crate::interactions::{DatabaseFinding, InteractionAdvisor, InteractionDatabase, LookupError};
use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    /// Record of all requests made
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockLlmService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful text response
    pub fn queue_text(&self, text: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(LlmResponse::text(text)));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

impl Default for MockLlmService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }

    fn model_id(&self) -> &str {
        "mock-model"
    }
}

// ============================================================================
// Stub Interaction Database
// ============================================================================

/// Exact-match pair table with optional failing pairs
#[derive(Debug, Default)]
pub struct StubInteractionDb {
    findings: HashMap<(String, String), Result<DatabaseFinding, LookupError>>,
    calls: Mutex<Vec<(String, String)>>,
}

impl StubInteractionDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_finding(
        mut self,
        drug_a: &str,
        drug_b: &str,
        severity: &str,
        description: &str,
    ) -> Self {
        self.findings.insert(
            (drug_a.to_string(), drug_b.to_string()),
            Ok(DatabaseFinding {
                severity: severity.to_string(),
                description: description.to_string(),
            }),
        );
        self
    }

    /// Make lookups of this pair throw
    pub fn with_failure(mut self, drug_a: &str, drug_b: &str) -> Self {
        self.findings.insert(
            (drug_a.to_string(), drug_b.to_string()),
            Err(LookupError::new(format!("lookup of {drug_a}/{drug_b} failed"))),
        );
        self
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl InteractionDatabase for StubInteractionDb {
    async fn check_interaction(
        &self,
        drug_a: &str,
        drug_b: &str,
    ) -> Result<Option<DatabaseFinding>, LookupError> {
        self.calls
            .lock()
            .unwrap()
            .push((drug_a.to_string(), drug_b.to_string()));
        match self.findings.get(&(drug_a.to_string(), drug_b.to_string())) {
            Some(Ok(finding)) => Ok(Some(finding.clone())),
            Some(Err(e)) => Err(e.clone()),
            None => Ok(None),
        }
    }
}

// ============================================================================
// Stub Advisor
// ============================================================================

/// Advisor that always answers the same way
#[derive(Debug)]
pub struct StubAdvisor {
    answer: Option<String>,
    calls: Mutex<usize>,
}

impl StubAdvisor {
    pub fn answering(text: impl Into<String>) -> Self {
        Self {
            answer: Some(text.into()),
            calls: Mutex::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            answer: None,
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl InteractionAdvisor for StubAdvisor {
    async fn check_interaction(&self, _drug_a: &str, _drug_b: &str) -> Result<String, LlmError> {
        *self.calls.lock().unwrap() += 1;
        self.answer
            .clone()
            .ok_or_else(|| LlmError::network("advisor unavailable"))
    }
}
