//! OpenAI chat completions provider.
//!
//! Also works with any endpoint speaking the same wire format when given a
//! base URL override.

use async_trait::async_trait;
use reqwest::Client;
use url::Url;

use super::error::{LLMError, check_response_error};
use super::provider::LLMProvider;
use super::types::{ChatChoice, ChatMessage, ChatResponse, ChatStructure};

const PROVIDER: &str = "openai";

/// OpenAI provider bound to one model.
///
/// A `Default` instance has no client and rejects every chat call with
/// [`LLMError::UninitializedClient`].
#[derive(Default)]
pub struct OpenAIProvider {
    client: Option<Client>,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAIProvider {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com/v1";

    /// Create a provider with a fresh HTTP client.
    ///
    /// An empty or missing `api_url` falls back to [`Self::DEFAULT_BASE_URL`].
    pub fn new(model: &str, api_key: &str, api_url: Option<&str>) -> Result<Self, LLMError> {
        Self::with_client(Client::new(), model, api_key, api_url)
    }

    /// Create a provider that sends requests through `client`.
    pub fn with_client(
        client: Client,
        model: &str,
        api_key: &str,
        api_url: Option<&str>,
    ) -> Result<Self, LLMError> {
        if api_key.is_empty() {
            return Err(LLMError::MissingCredential(PROVIDER));
        }

        let base_url = match api_url {
            Some(url) if !url.is_empty() => url,
            _ => Self::DEFAULT_BASE_URL,
        };
        validate_base_url(base_url)?;

        Ok(Self {
            client: Some(client),
            model: model.to_string(),
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LLMProvider for OpenAIProvider {
    fn model(&self) -> &str {
        &self.model
    }

    async fn chat(&self, structure: &ChatStructure) -> Result<ChatResponse, LLMError> {
        if structure.is_empty() {
            return Err(LLMError::EmptyInput);
        }
        let Some(client) = self.client.as_ref() else {
            return Err(LLMError::UninitializedClient(PROVIDER));
        };

        let url = format!("{}/chat/completions", self.base_url);
        let request = Request {
            model: &self.model,
            messages: &structure.messages,
        };

        tracing::debug!(
            model = %self.model,
            messages = structure.len(),
            "sending chat completion request"
        );

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        if let Some(err) = check_response_error(&response) {
            tracing::warn!(model = %self.model, error = %err, "chat completion rate limited");
            return Err(err);
        }
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(model = %self.model, status, "chat completion failed");
            return Err(LLMError::Api { status, message });
        }

        let response: Response = response.json().await?;
        from_response(response)
    }
}

/// Only absolute http(s) URLs can have `/chat/completions` appended.
fn validate_base_url(base_url: &str) -> Result<(), LLMError> {
    let invalid = |reason: String| LLMError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason,
    };

    let url = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme `{}`", url.scheme())));
    }
    if url.cannot_be_a_base() {
        return Err(invalid("cannot be used as a base url".to_string()));
    }
    Ok(())
}

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(serde::Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(serde::Deserialize)]
struct Response {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

fn from_response(response: Response) -> Result<ChatResponse, LLMError> {
    match response.choices.into_iter().next() {
        Some(choice) if !choice.message.content.is_empty() => Ok(ChatResponse {
            text: choice.message.content,
        }),
        _ => Err(LLMError::EmptyResponse(PROVIDER)),
    }
}
