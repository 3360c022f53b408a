//! Host configuration from the environment

use crate::interactions::{InteractionTable, TableError};
use crate::llm::{
    GroqService, LlmService, LoggingService, UnconfiguredService, DEFAULT_BASE_URL, DEFAULT_MODEL,
};
use crate::state_machine::DEFAULT_MAX_TURNS;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    /// JSON interaction table; none means every lookup is "no data"
    pub interactions_path: Option<PathBuf>,
    pub max_turns: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            interactions_path: None,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset; unparseable
    /// numbers fall back to the default with a warning.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Self {
            api_key: get("GROQ_API_KEY"),
            model: get("CHIRON_MODEL").unwrap_or(defaults.model),
            base_url: get("CHIRON_LLM_BASE_URL").unwrap_or(defaults.base_url),
            timeout: parse_or("CHIRON_LLM_TIMEOUT_SECS", get("CHIRON_LLM_TIMEOUT_SECS"))
                .map_or(defaults.timeout, Duration::from_secs),
            interactions_path: get("CHIRON_INTERACTIONS_PATH").map(PathBuf::from),
            max_turns: parse_or("CHIRON_MAX_TURNS", get("CHIRON_MAX_TURNS"))
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_turns),
        }
    }

    /// The generative collaborator, or a stand-in that fails every call
    pub fn llm_service(&self) -> Arc<dyn LlmService> {
        let Some(api_key) = &self.api_key else {
            tracing::warn!("GROQ_API_KEY not set; model-backed commands will fail");
            return Arc::new(UnconfiguredService::new("GROQ_API_KEY is not set"));
        };

        match GroqService::new(api_key.clone(), self.model.clone(), &self.base_url, self.timeout) {
            Ok(service) => Arc::new(LoggingService::new(Arc::new(service))),
            Err(e) => {
                tracing::error!(error = %e.message, "Failed to build LLM client");
                Arc::new(UnconfiguredService::new(e.message))
            }
        }
    }

    pub fn interaction_table(&self) -> Result<InteractionTable, TableError> {
        match &self.interactions_path {
            Some(path) => InteractionTable::from_path(path),
            None => {
                tracing::info!("No interaction table configured; database lookups return no data");
                Ok(InteractionTable::empty())
            }
        }
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, value: Option<String>) -> Option<T> {
    let value = value?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            tracing::warn!(key, value = %value, "Ignoring unparseable setting");
            None
        }
    }
}
