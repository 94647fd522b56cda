//! LLM error types

use thiserror::Error;

/// Errors that can occur during LLM operations.
///
/// The coach treats every variant identically (fallback reply), so the
/// distinctions exist for logging and tests, not control flow. There is no
/// retry tier: a single failed attempt degrades immediately.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
