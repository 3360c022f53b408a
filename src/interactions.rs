//! Drug interaction reconciliation
//!
//! Combines the structured interaction database with the free-text advisory
//! collaborator. Two contracts live here:
//!
//! - [`reconcile`]: every candidate against every current medication,
//!   aggregated into a [`SafetyReport`]
//! - [`check_pair`]: one pair, both sources side by side, no aggregation
//!
//! A failing pair never aborts a batch; it is recorded as a
//! [`PairOutcome::Failed`] and skipped.

mod advisor;
mod table;

#[cfg(test)]
mod proptests;

pub use advisor::LlmAdvisor;
pub use table::{InteractionTable, TableEntry, TableError};

use crate::error::IntakeError;
use crate::llm::LlmError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Severity recorded for advisory findings, which nothing has verified
pub const ADVISORY_SEVERITY: &str = "unverified";

/// What the interaction database knows about one pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseFinding {
    pub severity: String,
    pub description: String,
}

/// A knowledge-base lookup that threw
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct LookupError {
    pub message: String,
}

impl LookupError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Structured drug-interaction knowledge base
#[async_trait]
pub trait InteractionDatabase: Send + Sync {
    /// `Ok(None)` means no interaction is known, which is not an error
    async fn check_interaction(
        &self,
        drug_a: &str,
        drug_b: &str,
    ) -> Result<Option<DatabaseFinding>, LookupError>;
}

/// Unstructured fallback that answers in prose
#[async_trait]
pub trait InteractionAdvisor: Send + Sync {
    async fn check_interaction(&self, drug_a: &str, drug_b: &str) -> Result<String, LlmError>;
}

/// Where a finding came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSource {
    Database,
    Advisory,
}

/// One reported interaction between a candidate and a current medication
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionFinding {
    #[serde(rename = "with_drug")]
    pub partner_drug: String,
    pub severity: String,
    pub explanation: String,
    pub source: FindingSource,
}

impl InteractionFinding {
    fn from_database(partner: &str, finding: DatabaseFinding) -> Self {
        Self {
            partner_drug: partner.to_string(),
            severity: finding.severity,
            explanation: finding.description,
            source: FindingSource::Database,
        }
    }

    fn from_advisory(partner: &str, text: String) -> Self {
        Self {
            partner_drug: partner.to_string(),
            severity: ADVISORY_SEVERITY.to_string(),
            explanation: text,
            source: FindingSource::Advisory,
        }
    }
}

/// Result of checking one (candidate, current) pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum PairOutcome {
    Finding {
        finding: InteractionFinding,
        /// Set when the database lookup failed and the advisory answered instead
        #[serde(skip_serializing_if = "Option::is_none")]
        lookup_error: Option<String>,
    },
    NoData,
    Failed { message: String },
}

impl PairOutcome {
    /// The database lookup error behind this pair, if there was one
    pub fn lookup_error(&self) -> Option<&str> {
        match self {
            Self::Finding { lookup_error, .. } => lookup_error.as_deref(),
            Self::Failed { message } => Some(message),
            Self::NoData => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairResult {
    pub candidate: String,
    pub current: String,
    #[serde(flatten)]
    pub outcome: PairOutcome,
}

/// Candidate medication -> findings, in candidate order.
///
/// Only candidates with at least one finding have an entry. Built once by
/// [`reconcile`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafetyReport {
    entries: Vec<(String, Vec<InteractionFinding>)>,
    pairs: Vec<PairResult>,
}

impl SafetyReport {
    pub fn get(&self, medication: &str) -> Option<&[InteractionFinding]> {
        self.entries
            .iter()
            .find(|(name, _)| name == medication)
            .map(|(_, findings)| findings.as_slice())
    }

    pub fn medications(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[InteractionFinding])> {
        self.entries
            .iter()
            .map(|(name, findings)| (name.as_str(), findings.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every pair that was checked, including the ones with no data
    pub fn pairs(&self) -> &[PairResult] {
        &self.pairs
    }

    /// Pairs whose database lookup failed, whether or not the advisory
    /// covered them afterwards
    pub fn failures(&self) -> impl Iterator<Item = &PairResult> {
        self.pairs
            .iter()
            .filter(|p| p.outcome.lookup_error().is_some())
    }
}

impl Serialize for SafetyReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(name, findings)| (name, findings)))
    }
}

/// Knobs for [`reconcile`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ReconcileOptions {
    /// Ask the advisory collaborator about pairs the database has nothing on
    pub consult_advisory: bool,
}

/// Check every candidate against every current medication.
pub async fn reconcile(
    candidates: &[String],
    current_medications: &[String],
    lookup: &dyn InteractionDatabase,
    advisory: &dyn InteractionAdvisor,
    options: ReconcileOptions,
) -> SafetyReport {
    let mut report = SafetyReport::default();
    let mut seen = HashSet::new();

    for candidate in candidates {
        if !seen.insert(candidate.as_str()) {
            tracing::debug!(candidate = %candidate, "Skipping repeated candidate");
            continue;
        }

        let mut findings = Vec::new();
        for current in current_medications {
            let outcome = check_one(candidate, current, lookup, advisory, options).await;
            if let PairOutcome::Finding { finding, .. } = &outcome {
                findings.push(finding.clone());
            }
            report.pairs.push(PairResult {
                candidate: candidate.clone(),
                current: current.clone(),
                outcome,
            });
        }

        if !findings.is_empty() {
            report.entries.push((candidate.clone(), findings));
        }
    }

    tracing::info!(
        candidates = candidates.len(),
        current = current_medications.len(),
        flagged = report.len(),
        failed = report.failures().count(),
        "Interaction reconciliation finished"
    );

    report
}

async fn check_one(
    candidate: &str,
    current: &str,
    lookup: &dyn InteractionDatabase,
    advisory: &dyn InteractionAdvisor,
    options: ReconcileOptions,
) -> PairOutcome {
    let database_outcome = match lookup.check_interaction(candidate, current).await {
        Ok(Some(found)) => {
            return PairOutcome::Finding {
                finding: InteractionFinding::from_database(current, found),
                lookup_error: None,
            }
        }
        Ok(None) => PairOutcome::NoData,
        Err(e) => {
            let failure = IntakeError::LookupFailure {
                drug_a: candidate.to_string(),
                drug_b: current.to_string(),
                message: e.message,
            };
            tracing::warn!(error = %failure, "Skipping pair");
            PairOutcome::Failed {
                message: failure.to_string(),
            }
        }
    };

    if !options.consult_advisory {
        return database_outcome;
    }

    match advisory.check_interaction(candidate, current).await {
        Ok(text) if !text.trim().is_empty() => PairOutcome::Finding {
            finding: InteractionFinding::from_advisory(current, text.trim().to_string()),
            lookup_error: database_outcome.lookup_error().map(str::to_string),
        },
        Ok(_) => database_outcome,
        Err(e) => {
            tracing::warn!(
                candidate = %candidate,
                current = %current,
                error = %e.message,
                "Advisory interaction check failed, skipping pair"
            );
            database_outcome
        }
    }
}

/// Both sources' view of a single pair
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PairCheck {
    pub database_result: Option<DatabaseFinding>,
    pub ai_result: Option<String>,
}

/// Check one pair against both collaborators.
///
/// Names are trimmed and lowercased. Each source failing is tolerated; both
/// coming back empty is reported as the collaborators being unavailable.
pub async fn check_pair(
    drug_a: &str,
    drug_b: &str,
    lookup: &dyn InteractionDatabase,
    advisory: &dyn InteractionAdvisor,
) -> Result<PairCheck, IntakeError> {
    let drug_a = drug_a.trim().to_lowercase();
    let drug_b = drug_b.trim().to_lowercase();
    if drug_a.is_empty() || drug_b.is_empty() {
        return Err(IntakeError::invalid_input("Both drug names are required"));
    }

    let mut check = PairCheck::default();

    match lookup.check_interaction(&drug_a, &drug_b).await {
        Ok(found) => check.database_result = found,
        Err(e) => tracing::warn!(drug_a = %drug_a, drug_b = %drug_b, error = %e, "Database check failed"),
    }

    match advisory.check_interaction(&drug_a, &drug_b).await {
        Ok(text) if !text.trim().is_empty() => check.ai_result = Some(text.trim().to_string()),
        Ok(_) => tracing::warn!(drug_a = %drug_a, drug_b = %drug_b, "Advisory check returned nothing"),
        Err(e) => tracing::warn!(drug_a = %drug_a, drug_b = %drug_b, error = %e.message, "Advisory check failed"),
    }

    if check.database_result.is_none() && check.ai_result.is_none() {
        return Err(IntakeError::CollaboratorUnavailable {
            kind: crate::llm::LlmErrorKind::Unknown,
            message: "Unable to check interactions at this time. Please try again later."
                .to_string(),
        });
    }

    Ok(check)
}

/// Reconciler with its collaborators already wired in
#[derive(Clone)]
pub struct InteractionReconciler {
    lookup: Arc<dyn InteractionDatabase>,
    advisory: Arc<dyn InteractionAdvisor>,
    options: ReconcileOptions,
}

impl InteractionReconciler {
    pub fn new(lookup: Arc<dyn InteractionDatabase>, advisory: Arc<dyn InteractionAdvisor>) -> Self {
        Self {
            lookup,
            advisory,
            options: ReconcileOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ReconcileOptions) -> Self {
        self.options = options;
        self
    }

    pub async fn reconcile(&self, candidates: &[String], current: &[String]) -> SafetyReport {
        reconcile(
            candidates,
            current,
            self.lookup.as_ref(),
            self.advisory.as_ref(),
            self.options,
        )
        .await
    }

    pub async fn check_pair(&self, drug_a: &str, drug_b: &str) -> Result<PairCheck, IntakeError> {
        check_pair(drug_a, drug_b, self.lookup.as_ref(), self.advisory.as_ref()).await
    }
}
