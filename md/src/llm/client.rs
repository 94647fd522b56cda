//! LlmClient trait definition

use async_trait::async_trait;

use super::{CompletionRequest, CompletionResponse, LlmError};

/// Stateless LLM client - each call is independent.
///
/// The coach assembles the full conversation window per request, so no
/// state is kept between calls. Implementations must not retry internally:
/// a failed attempt degrades to the fallback path with bounded latency.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Send a single completion request (blocking until complete)
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}
