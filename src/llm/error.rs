//! Failures of the model collaborator
//!
//! The dialogue, the pipeline and the advisor all treat a model failure as
//! recoverable: the host shows a fallback message and the session carries on.
//! The kind only matters to a host that wants to retry.

use thiserror::Error;

/// A model call that produced no usable answer
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct LlmError {
    pub kind: LlmErrorKind,
    pub message: String,
}

impl LlmError {
    pub fn new(kind: LlmErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Classify a non-success HTTP status from a chat-completions endpoint
    pub fn from_status(status: u16, detail: &str) -> Self {
        match status {
            401 | 403 => Self::auth(format!("Authentication failed: {detail}")),
            429 => Self::rate_limit(format!("Rate limit exceeded: {detail}")),
            400 | 404 | 422 => Self::new(
                LlmErrorKind::Rejected,
                format!("Request rejected: {detail}"),
            ),
            500..=599 => Self::server_error(format!("Server error: {detail}")),
            _ => Self::unknown(format!("HTTP {status}: {detail}")),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Network, message)
    }

    pub fn rate_limit(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::RateLimit, message)
    }

    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::ServerError, message)
    }

    /// Also used when no API key is configured at all
    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Auth, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(LlmErrorKind::Unknown, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmErrorKind {
    /// Endpoint unreachable, timed out, or the body was cut off
    Network,
    /// Groq free-tier quotas are the usual cause
    RateLimit,
    /// 5xx from the endpoint
    ServerError,
    /// Bad or missing API key
    Auth,
    /// The endpoint refused the request itself, e.g. an unknown model name
    Rejected,
    /// Unparseable or empty replies, and anything unclassified
    Unknown,
}

impl LlmErrorKind {
    /// Worth asking again later. Nothing in this crate retries; the host may.
    pub fn is_transient(self) -> bool {
        matches!(self, Self::Network | Self::RateLimit | Self::ServerError)
    }
}
