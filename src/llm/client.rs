use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while turning a request into a command
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("API request failed: {0}")]
    ApiError(String),

    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimitExceeded(u64),

    #[error("Request timeout")]
    Timeout,

    #[error("No command generated")]
    EmptyResponse,

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A shell command proposed for a natural-language request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedCommand {
    pub command: String,
    pub explanation: Option<String>,
}

/// Anything that can propose a shell command for a request
///
/// Implementations wrap a model provider; the output is untrusted and always
/// goes through the validator before it can run.
#[async_trait]
pub trait CommandGenerator: Send + Sync {
    async fn generate(&self, request: &str, explain: bool) -> Result<GeneratedCommand, GenerationError>;
}
