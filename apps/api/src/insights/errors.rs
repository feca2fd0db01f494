//! Failure taxonomy for the insight pipeline.

use thiserror::Error;

use crate::llm_client::LlmError;

/// Classified failure of a single attempt. Every variant is retryable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttemptError {
    #[error("Empty response from AI model")]
    EmptyResponse,

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("JSON parsing error: {0}")]
    MalformedPayload(String),

    #[error("Missing required field: {missing_key}")]
    SchemaViolation { missing_key: &'static str },
}

impl AttemptError {
    /// Stable kind name used in logs and client-facing error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            AttemptError::EmptyResponse => "EmptyResponse",
            AttemptError::Transport(_) => "TransportError",
            AttemptError::MalformedPayload(_) => "MalformedPayload",
            AttemptError::SchemaViolation { .. } => "SchemaViolation",
        }
    }
}

impl From<LlmError> for AttemptError {
    fn from(e: LlmError) -> Self {
        match e {
            LlmError::EmptyResponse => AttemptError::EmptyResponse,
            other => AttemptError::Transport(other.to_string()),
        }
    }
}

/// Terminal failure: every permitted attempt failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to generate AI insights after {attempts} attempts. Last error: {last_error}")]
pub struct InsightGenerationFailed {
    pub attempts: u32,
    pub last_error: AttemptError,
}
