//! LLM error types.

use thiserror::Error;

/// Check an HTTP response for rate-limit errors, returning `RateLimit` for 429.
pub fn check_response_error(response: &reqwest::Response) -> Option<LLMError> {
    if response.status().is_success() {
        return None;
    }
    if response.status().as_u16() == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        return Some(LLMError::RateLimit { retry_after });
    }
    None
}

/// Errors that can occur when resolving a model or making a chat call.
#[derive(Debug, Error)]
pub enum LLMError {
    /// No constructor is registered under the requested model name
    #[error("unsupported model: {0} (not registered)")]
    UnregisteredModel(String),

    /// Provider construction attempted without an API key
    #[error("{0} api key is required")]
    MissingCredential(&'static str),

    /// Base URL could not be parsed
    #[error("invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Chat called with an empty conversation
    #[error("no messages provided in chat structure")]
    EmptyInput,

    /// Chat called on a provider whose client was never built
    #[error("{0} client not initialized")]
    UninitializedClient(&'static str),

    /// HTTP request failed
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// API returned an error response
    #[error("api error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Rate limited (429)
    #[error("rate limited (retry after {retry_after:?}s)")]
    RateLimit { retry_after: Option<u64> },

    /// Upstream answered without any usable content
    #[error("no response content received from {0}")]
    EmptyResponse(&'static str),
}

impl LLMError {
    /// Whether the error came from the transport or the remote API.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            LLMError::Request(_) | LLMError::Api { .. } | LLMError::RateLimit { .. }
        )
    }
}
